mod chat;
mod coach;
mod msg;
mod new;
mod pin;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    models::ChatSession,
    store::Storage,
    validate::Validate,
    AppError, AppResult, AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chats", post(new::create))
        .route("/chats/me", get(chat::mine))
        .route("/chats/{chatId}", get(chat::get))
        .route("/chats/{chatId}/messages", get(msg::list).post(msg::post))
        .route("/chats/{chatId}/messages/latest", get(msg::latest))
        .route("/chats/{chatId}/messages/{messageId}/feedback", post(msg::feedback))
        .route("/chats/{chatId}/pin", post(pin::pin).delete(pin::unpin))
        .route("/chats/{chatId}/analysis", post(coach::analysis))
        .route("/chats/{chatId}/voice", post(coach::voice))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatParams {
    chat_id: Uuid,
}

impl Validate for ChatParams {}

async fn find_chat(storage: &Storage, chat_id: Uuid) -> AppResult<ChatSession> {
    storage
        .chats
        .get_by_id(chat_id)
        .await?
        .ok_or_else(|| AppError::not_found("Chat not found"))
}
