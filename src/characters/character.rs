use axum::{debug_handler, extract::State};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    models::{Character, CharacterPatch, Greeting, Visibility},
    res::{Envelope, Success, SUCCESS},
    store::Storage,
    validate::{FieldErrors, IdParam, Skip, Validate, Validated},
    AppError, AppResult, AppState,
};

use super::{new::check_greetings, CharacterBody};

async fn find(storage: &Storage, id: Uuid) -> AppResult<Character> {
    storage
        .characters
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Character not found"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn get(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, IdParam>,
) -> AppResult<Envelope<CharacterBody>> {
    let character = find(&storage, params.id).await?;
    Ok(Envelope::ok(CharacterBody { character }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CharacterPatchBody {
    name: Option<String>,
    tagline: Option<String>,
    description: Option<String>,
    greetings: Option<Vec<Greeting>>,
    tags: Option<Vec<String>>,
    visibility: Option<Visibility>,
    ai_greeting_enabled: Option<bool>,
    avatar_upload_id: Option<Uuid>,
}

impl Validate for CharacterPatchBody {
    fn validate(&self, errors: &mut FieldErrors) {
        if let Some(name) = &self.name {
            errors.min_len("name", name, 1);
        }
        if let Some(greetings) = &self.greetings {
            check_greetings(greetings, errors);
        }
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn update(
    State(storage): State<Storage>,
    Validated { body, params, .. }: Validated<CharacterPatchBody, Skip, IdParam>,
) -> AppResult<Envelope<CharacterBody>> {
    let current = find(&storage, params.id).await?;
    if current.visibility == Visibility::Public && body.visibility.is_some_and(|v| v != Visibility::Public) {
        let mut errors = FieldErrors::default();
        errors.add("visibility", "Published characters cannot be unpublished");
        return Err(AppError::validation("Validation failed", errors));
    }

    // an unknown upload id keeps the current avatar
    let avatar_url = storage.resolve_upload(body.avatar_upload_id).await?;
    let patch = CharacterPatch {
        name: body.name,
        tagline: body.tagline,
        description: body.description,
        greetings: body.greetings,
        tags: body.tags,
        visibility: body.visibility,
        ai_greeting_enabled: body.ai_greeting_enabled,
        avatar_url,
    };
    let character = storage
        .characters
        .update(params.id, patch)
        .await
        .map_err(AppError::from_store)?;

    Ok(Envelope::ok(CharacterBody { character }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn publish(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, IdParam>,
) -> AppResult<Envelope<CharacterBody>> {
    find(&storage, params.id).await?;

    let patch = CharacterPatch {
        visibility: Some(Visibility::Public),
        ..Default::default()
    };
    let character = storage
        .characters
        .update(params.id, patch)
        .await
        .map_err(AppError::from_store)?;

    Ok(Envelope::ok(CharacterBody { character }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, IdParam>,
) -> AppResult<Envelope<Success>> {
    find(&storage, params.id).await?;
    storage.characters.delete(params.id).await?;
    Ok(Envelope::ok(SUCCESS))
}
