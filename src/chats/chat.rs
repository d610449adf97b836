use axum::{debug_handler, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    models::{Character, ChatSession, Scene},
    res::{self, Envelope, Items},
    session::CurrentUser,
    store::{PinStore, Storage},
    validate::{Skip, Validate, Validated},
    AppResult, AppState,
};

use super::{find_chat, ChatParams};

#[derive(Debug, Serialize)]
pub(crate) struct ChatDetail {
    chat: ChatSession,
    scene: Option<Scene>,
    character: Option<Character>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn get(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, ChatParams>,
) -> AppResult<Envelope<ChatDetail>> {
    let chat = find_chat(&storage, params.chat_id).await?;
    let scene = storage.scenes.get_by_id(chat.scene_id).await?;
    let character = match chat.character_id {
        Some(id) => storage.characters.get_by_id(id).await?,
        None => None,
    };

    Ok(Envelope::ok(ChatDetail { chat, scene, character }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Scope {
    #[default]
    Recent,
    Pinned,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScopeQuery {
    #[serde(default)]
    scope: Scope,
}

impl Validate for ScopeQuery {}

#[debug_handler(state = AppState)]
pub(crate) async fn mine(
    State(storage): State<Storage>,
    State(pins): State<PinStore>,
    CurrentUser(user): CurrentUser,
    Validated { query, .. }: Validated<Skip, ScopeQuery>,
) -> AppResult<Envelope<Items<ChatSession>>> {
    let chats = match query.scope {
        Scope::Recent => storage.chats.list_recent_by_user(user.id).await?,
        Scope::Pinned => {
            let mut chats = Vec::new();
            // pins can outlive their chats
            for chat_id in pins.pinned(user.id)? {
                if let Some(chat) = storage.chats.get_by_id(chat_id).await? {
                    chats.push(chat);
                }
            }
            chats
        }
    };
    Ok(res::list(chats))
}
