use axum::{debug_handler, extract::State};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    models::{NewScene, SceneStatus, SceneType, Visibility},
    res::Envelope,
    session::CurrentUser,
    store::Storage,
    validate::{Validate, Validated},
    AppResult, AppState,
};

use super::SceneBody;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewSceneBody {
    #[serde(rename = "type")]
    scene_type: SceneType,
    genres: Vec<String>,
    time_periods: Vec<String>,
    locations: Vec<String>,
    tones: Vec<String>,
    backstory: String,
    player_goal: String,
    intro_text: String,
    character_greeting: String,
    name: String,
    chat_theme_color: String,
    tags: Vec<String>,
    visibility: Visibility,
    status: Option<SceneStatus>,
    cover_upload_id: Option<Uuid>,
    linked_character_id: Option<Uuid>,
}

impl Validate for NewSceneBody {}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(storage): State<Storage>,
    CurrentUser(user): CurrentUser,
    Validated { body, .. }: Validated<NewSceneBody>,
) -> AppResult<Envelope<SceneBody>> {
    let cover_image_url = storage.resolve_upload(body.cover_upload_id).await?;

    let scene = storage
        .scenes
        .insert(NewScene {
            owner_id: user.id,
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
            status: body.status.unwrap_or(SceneStatus::Draft),
            linked_character_id: body.linked_character_id,
        })
        .await?;

    Ok(Envelope::created(SceneBody { scene }))
}
