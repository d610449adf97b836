use std::collections::BTreeSet;

use axum::{
    debug_handler,
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    models::{Character, Scene},
    res::Envelope,
    store::Storage,
    validate::{IdParam, Skip, Validate, Validated},
    AppError, AppResult, AppState,
};

const TRENDING_EACH: usize = 3;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(tags))
        .route("/collections", get(collections))
        .route("/collections/{id}/items", post(add_collection_item))
        .route("/chat/options", get(chat_options))
        .route("/trending", get(trending))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TagSource {
    Scene,
    Character,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagsQuery {
    #[serde(rename = "type")]
    source: Option<TagSource>,
}

impl Validate for TagsQuery {}

#[derive(Debug, Serialize)]
pub(crate) struct Tags {
    tags: Vec<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn tags(
    State(storage): State<Storage>,
    Validated { query, .. }: Validated<Skip, TagsQuery>,
) -> AppResult<Envelope<Tags>> {
    let wants = |source: TagSource| query.source.is_none_or(|s| s == source);
    let mut tags = BTreeSet::new();

    if wants(TagSource::Character) {
        for character in storage.characters.list_public().await? {
            tags.extend(character.tags);
        }
    }
    if wants(TagSource::Scene) {
        for scene in storage.scenes.list_public().await? {
            tags.extend(scene.tags);
        }
    }

    Ok(Envelope::ok(Tags { tags: tags.into_iter().collect() }))
}

#[derive(Debug, Serialize)]
pub(crate) struct Collections {
    featured: Vec<Scene>,
    popular: Vec<Scene>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn collections(State(storage): State<Storage>) -> AppResult<Envelope<Collections>> {
    Ok(Envelope::ok(Collections {
        featured: storage.collections.list_featured().await?,
        popular: storage.collections.list_popular().await?,
    }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn add_collection_item(_: Validated<Skip, Skip, IdParam>) -> AppError {
    AppError::not_implemented("Collection mutation endpoints require authentication")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoiceOption {
    id: &'static str,
    label: &'static str,
    preview_url: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatOptions {
    voices: Vec<VoiceOption>,
    styles: [&'static str; 3],
    safety_levels: [&'static str; 3],
}

#[debug_handler]
pub(crate) async fn chat_options() -> Envelope<ChatOptions> {
    let voice = |id, label| VoiceOption { id, label, preview_url: None };
    Envelope::ok(ChatOptions {
        voices: vec![
            voice("reyes", "Captain Reyes"),
            voice("okafor", "Lieutenant Okafor"),
            voice("lindqvist", "Coxswain Lindqvist"),
        ],
        styles: ["supportive", "direct", "challenging"],
        safety_levels: ["standard", "professional", "roleplay"],
    })
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Entity {
    Scene(Scene),
    Character(Character),
}

#[derive(Debug, Serialize)]
pub(crate) struct Trending {
    terms: [&'static str; 3],
    entities: Vec<Entity>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn trending(State(storage): State<Storage>) -> AppResult<Envelope<Trending>> {
    let scenes = storage.scenes.list_public().await?;
    let characters = storage.characters.list_public().await?;

    let entities = scenes
        .into_iter()
        .take(TRENDING_EACH)
        .map(Entity::Scene)
        .chain(characters.into_iter().take(TRENDING_EACH).map(Entity::Character))
        .collect();

    Ok(Envelope::ok(Trending {
        terms: ["crisis management", "tone control", "leadership lab"],
        entities,
    }))
}
