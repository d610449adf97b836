use axum::{debug_handler, extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};

use crate::{
    models::{Character, PublicUser, Scene},
    res::Envelope,
    store::Storage,
    validate::{FieldErrors, Skip, Validate, Validated},
    AppResult, AppState,
};

const MAX_SUGGESTIONS: usize = 8;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/search/suggestions", get(suggestions))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Character,
    Scene,
    User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    q: String,
    #[serde(rename = "type")]
    kind: Option<SearchType>,
}

impl Validate for SearchQuery {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.min_len("q", &self.q, 1);
    }
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct Results {
    characters: Vec<Character>,
    scenes: Vec<Scene>,
    users: Vec<PublicUser>,
}

fn hit(value: &str, term: &str) -> bool {
    value.to_lowercase().contains(term)
}

#[debug_handler(state = AppState)]
pub(crate) async fn search(
    State(storage): State<Storage>,
    Validated { query, .. }: Validated<Skip, SearchQuery>,
) -> AppResult<Envelope<Results>> {
    let term = query.q.to_lowercase();
    let wants = |kind: SearchType| query.kind.is_none_or(|k| k == kind);
    let mut results = Results::default();

    if wants(SearchType::Character) {
        results.characters = storage.characters.list_public().await?;
        results.characters.retain(|c| hit(&c.name, &term));
    }
    if wants(SearchType::Scene) {
        results.scenes = storage.scenes.list_public().await?;
        results.scenes.retain(|s| hit(&s.name, &term));
    }
    if wants(SearchType::User) {
        results.users = storage
            .users
            .all()
            .await?
            .into_iter()
            .filter(|u| hit(&u.username, &term))
            .map(PublicUser::from)
            .collect();
    }

    Ok(Envelope::ok(results))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionsQuery {
    q: Option<String>,
}

impl Validate for SuggestionsQuery {}

#[derive(Debug, Serialize)]
pub(crate) struct Suggestions {
    suggestions: Vec<String>,
}

/// Character names first, then scene names.
#[debug_handler(state = AppState)]
pub(crate) async fn suggestions(
    State(storage): State<Storage>,
    Validated { query, .. }: Validated<Skip, SuggestionsQuery>,
) -> AppResult<Envelope<Suggestions>> {
    let term = query.q.unwrap_or_default().to_lowercase();
    let characters = storage.characters.list_public().await?;
    let scenes = storage.scenes.list_public().await?;

    let suggestions = characters
        .into_iter()
        .map(|c| c.name)
        .chain(scenes.into_iter().map(|s| s.name))
        .filter(|name| hit(name, &term))
        .take(MAX_SUGGESTIONS)
        .collect();

    Ok(Envelope::ok(Suggestions { suggestions }))
}
