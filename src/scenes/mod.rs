mod list;
mod new;
mod scene;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::{models::Scene, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scenes", get(list::list).post(new::create))
        .route("/scenes/me", get(list::mine))
        .route(
            "/scenes/{id}",
            get(scene::get).patch(scene::update).delete(scene::delete),
        )
        .route("/scenes/{id}/publish", post(scene::publish))
}

#[derive(Debug, Serialize)]
pub(crate) struct SceneBody {
    scene: Scene,
}
