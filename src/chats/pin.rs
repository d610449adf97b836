use axum::{debug_handler, extract::State};
use serde::Serialize;

use crate::{
    res::Envelope,
    session::CurrentUser,
    store::{PinStore, Storage},
    validate::{Skip, Validated},
    AppResult, AppState,
};

use super::{find_chat, ChatParams};

#[derive(Debug, Serialize)]
pub(crate) struct Pinned {
    pinned: bool,
}

#[debug_handler(state = AppState)]
pub(crate) async fn pin(
    State(storage): State<Storage>,
    State(pins): State<PinStore>,
    CurrentUser(user): CurrentUser,
    Validated { params, .. }: Validated<Skip, Skip, ChatParams>,
) -> AppResult<Envelope<Pinned>> {
    let chat = find_chat(&storage, params.chat_id).await?;
    pins.pin(user.id, chat.id)?;
    Ok(Envelope::ok(Pinned { pinned: true }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn unpin(
    State(pins): State<PinStore>,
    CurrentUser(user): CurrentUser,
    Validated { params, .. }: Validated<Skip, Skip, ChatParams>,
) -> AppResult<Envelope<Pinned>> {
    pins.unpin(user.id, params.chat_id)?;
    Ok(Envelope::ok(Pinned { pinned: false }))
}
