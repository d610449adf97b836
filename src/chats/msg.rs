use axum::{debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{ChatPatch, LikeState, Message, MessageMetadata, MessagePatch, NewMessage, Sender},
    res::{self, Envelope, Items},
    store::Storage,
    validate::{FieldErrors, Skip, Validate, Validated},
    AppError, AppResult, AppState,
};

use super::{find_chat, ChatParams};

const MAX_PAGE: usize = 500;

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesQuery {
    limit: Option<usize>,
}

impl Validate for MessagesQuery {
    fn validate(&self, errors: &mut FieldErrors) {
        if let Some(limit) = self.limit {
            if !(1..=MAX_PAGE).contains(&limit) {
                errors.add("limit", format!("Must be between 1 and {MAX_PAGE}"));
            }
        }
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    State(storage): State<Storage>,
    Validated { query, params, .. }: Validated<Skip, MessagesQuery, ChatParams>,
) -> AppResult<Envelope<Items<Message>>> {
    let chat = find_chat(&storage, params.chat_id).await?;
    let messages = storage.messages.list_by_chat_id(chat.id, query.limit).await?;
    Ok(res::list(messages))
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageBody {
    message: Message,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostBody {
    body: String,
}

impl Validate for PostBody {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.min_len("body", &self.body, 1);
    }
}

/// Appends a user line. AI replies are produced client-side.
#[debug_handler(state = AppState)]
pub(crate) async fn post(
    State(storage): State<Storage>,
    Validated { body, params, .. }: Validated<PostBody, Skip, ChatParams>,
) -> AppResult<Envelope<MessageBody>> {
    let chat = find_chat(&storage, params.chat_id).await?;

    let message = storage
        .messages
        .insert(NewMessage {
            chat_id: chat.id,
            sender: Sender::User,
            body: body.body,
            metadata: Some(MessageMetadata::default()),
        })
        .await?;

    let touch = ChatPatch {
        last_activity_at: Some(message.created_at),
        ..Default::default()
    };
    storage
        .chats
        .update(chat.id, touch)
        .await
        .map_err(AppError::from_store)?;

    Ok(Envelope::created(MessageBody { message }))
}

#[derive(Debug, Serialize)]
pub(crate) struct Latest {
    message: Option<Message>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn latest(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, ChatParams>,
) -> AppResult<Envelope<Latest>> {
    let chat = find_chat(&storage, params.chat_id).await?;
    let message = storage.messages.list_by_chat_id(chat.id, None).await?.pop();
    Ok(Envelope::ok(Latest { message }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageParams {
    chat_id: Uuid,
    message_id: Uuid,
}

impl Validate for MessageParams {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeedbackBody {
    like_state: LikeState,
}

impl Validate for FeedbackBody {}

#[debug_handler(state = AppState)]
pub(crate) async fn feedback(
    State(storage): State<Storage>,
    Validated { body, params, .. }: Validated<FeedbackBody, Skip, MessageParams>,
) -> AppResult<Envelope<MessageBody>> {
    let chat = find_chat(&storage, params.chat_id).await?;
    let found = storage.messages.get_by_id(params.message_id).await?;
    if !found.is_some_and(|m| m.chat_id == chat.id) {
        return Err(AppError::not_found("Message not found"));
    }

    let patch = MessagePatch {
        like_state: Some(body.like_state),
    };
    let message = storage
        .messages
        .update(params.message_id, patch)
        .await
        .map_err(AppError::from_store)?;

    Ok(Envelope::ok(MessageBody { message }))
}
