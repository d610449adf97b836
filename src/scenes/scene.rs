use axum::{debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{Character, Scene, ScenePatch, SceneStatus, SceneType, Visibility},
    res::{Envelope, Success, SUCCESS},
    store::Storage,
    validate::{FieldErrors, IdParam, Skip, Validate, Validated},
    AppError, AppResult, AppState,
};

use super::SceneBody;

async fn find(storage: &Storage, id: Uuid) -> AppResult<Scene> {
    storage
        .scenes
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Scene not found"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SceneDetail {
    scene: Scene,
    related_characters: Vec<Character>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn get(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, IdParam>,
) -> AppResult<Envelope<SceneDetail>> {
    let scene = find(&storage, params.id).await?;
    let related_characters = storage.characters.list_by_owner(scene.owner_id).await?;
    Ok(Envelope::ok(SceneDetail { scene, related_characters }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScenePatchBody {
    #[serde(rename = "type")]
    scene_type: Option<SceneType>,
    genres: Option<Vec<String>>,
    time_periods: Option<Vec<String>>,
    locations: Option<Vec<String>>,
    tones: Option<Vec<String>>,
    backstory: Option<String>,
    player_goal: Option<String>,
    intro_text: Option<String>,
    character_greeting: Option<String>,
    name: Option<String>,
    chat_theme_color: Option<String>,
    tags: Option<Vec<String>>,
    visibility: Option<Visibility>,
    status: Option<SceneStatus>,
    cover_upload_id: Option<Uuid>,
    linked_character_id: Option<Uuid>,
}

impl Validate for ScenePatchBody {}

#[debug_handler(state = AppState)]
pub(crate) async fn update(
    State(storage): State<Storage>,
    Validated { body, params, .. }: Validated<ScenePatchBody, Skip, IdParam>,
) -> AppResult<Envelope<SceneBody>> {
    let current = find(&storage, params.id).await?;
    let mut errors = FieldErrors::default();
    if current.visibility == Visibility::Public && body.visibility.is_some_and(|v| v != Visibility::Public) {
        errors.add("visibility", "Published scenes cannot be unpublished");
    }
    if current.status == SceneStatus::Published && body.status.is_some_and(|s| s != SceneStatus::Published) {
        errors.add("status", "Published scenes cannot return to draft");
    }
    if !errors.is_empty() {
        return Err(AppError::validation("Validation failed", errors));
    }

    let cover_image_url = storage.resolve_upload(body.cover_upload_id).await?;
    let patch = ScenePatch {
        scene_type: body.scene_type,
        genres: body.genres,
        time_periods: body.time_periods,
        locations: body.locations,
        tones: body.tones,
        backstory: body.backstory,
        player_goal: body.player_goal,
        intro_text: body.intro_text,
        character_greeting: body.character_greeting,
        name: body.name,
        cover_image_url,
        chat_theme_color: body.chat_theme_color,
        tags: body.tags,
        visibility: body.visibility,
        status: body.status,
        linked_character_id: body.linked_character_id,
    };
    let scene = storage
        .scenes
        .update(params.id, patch)
        .await
        .map_err(AppError::from_store)?;

    Ok(Envelope::ok(SceneBody { scene }))
}

/// Draft to published, private to public. Publishing twice is a no-op.
#[debug_handler(state = AppState)]
pub(crate) async fn publish(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, IdParam>,
) -> AppResult<Envelope<SceneBody>> {
    find(&storage, params.id).await?;

    let patch = ScenePatch {
        status: Some(SceneStatus::Published),
        visibility: Some(Visibility::Public),
        ..Default::default()
    };
    let scene = storage
        .scenes
        .update(params.id, patch)
        .await
        .map_err(AppError::from_store)?;

    Ok(Envelope::ok(SceneBody { scene }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, IdParam>,
) -> AppResult<Envelope<Success>> {
    find(&storage, params.id).await?;
    storage.scenes.delete(params.id).await?;
    Ok(Envelope::ok(SUCCESS))
}
