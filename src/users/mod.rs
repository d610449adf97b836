mod me;
mod profile;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me::me).patch(me::update_profile))
        .route("/me/activity", get(me::activity))
        .route("/me/preferences", patch(me::update_preferences))
        .route("/users/{userId}", get(profile::user))
}
