mod character;
mod list;
mod new;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::{models::Character, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/characters", get(list::list).post(new::create))
        .route("/characters/me", get(list::mine))
        .route(
            "/characters/{id}",
            get(character::get).patch(character::update).delete(character::delete),
        )
        .route("/characters/{id}/publish", post(character::publish))
}

#[derive(Debug, Serialize)]
pub(crate) struct CharacterBody {
    character: Character,
}
