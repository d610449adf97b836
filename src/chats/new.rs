use axum::{debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{ChatSession, ChatSettings, MessageMetadata, NewChat, NewMessage, Sender},
    res::Envelope,
    session::CurrentUser,
    store::Storage,
    validate::{Validate, Validated},
    AppError, AppResult, AppState,
};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ChatMode {
    #[default]
    Story,
    Practice,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewChatBody {
    scene_id: Uuid,
    character_id: Option<Uuid>,
    #[serde(default)]
    mode: ChatMode,
}

impl Validate for NewChatBody {}

#[derive(Debug, Serialize)]
pub(crate) struct ChatBody {
    chat: ChatSession,
}

/// Starts a chat on a scene and opens it with the scene's intro as the
/// first AI line.
#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(storage): State<Storage>,
    CurrentUser(user): CurrentUser,
    Validated { body, .. }: Validated<NewChatBody>,
) -> AppResult<Envelope<ChatBody>> {
    let Some(scene) = storage.scenes.get_by_id(body.scene_id).await? else {
        return Err(AppError::not_found("Scene not found"));
    };

    let chat = storage
        .chats
        .insert(NewChat {
            user_id: user.id,
            scene_id: scene.id,
            character_id: body.character_id.or(scene.linked_character_id),
            title: scene.name,
            settings: ChatSettings::default(),
        })
        .await?;

    storage
        .messages
        .insert(NewMessage {
            chat_id: chat.id,
            sender: Sender::Ai,
            body: scene.intro_text,
            metadata: Some(MessageMetadata {
                sentiment: Some("supportive".to_owned()),
                tone: Some("mentor".to_owned()),
                actions: vec!["introduce-scenario".to_owned()],
            }),
        })
        .await?;

    if let Some(mut metrics) = storage.profile_metrics.get_by_user_id(user.id).await? {
        metrics.total_chats += 1;
        storage.profile_metrics.upsert(metrics).await?;
    }

    tracing::debug!(chat_id = %chat.id, mode = ?body.mode, "chat started");
    Ok(Envelope::created(ChatBody { chat }))
}
