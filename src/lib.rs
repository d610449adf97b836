pub mod appresult;
pub mod auth;
pub mod characters;
pub mod chats;
pub mod config;
pub mod discover;
pub mod listing;
pub mod metadata;
pub mod middleware;
pub mod models;
pub mod res;
pub mod scenes;
pub mod search;
pub mod security;
pub mod session;
pub mod store;
pub mod uploads;
pub mod users;
pub mod validate;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
use config::Config;
use store::{PinStore, PreferenceStore, Storage};

pub const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub storage: Storage,
    pub pins: PinStore,
    pub preferences: PreferenceStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(storage: Storage, config: Config) -> Self {
        Self {
            storage,
            pins: PinStore::default(),
            preferences: PreferenceStore::default(),
            config: Arc::new(config),
        }
    }
}

fn api() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(characters::router())
        .merge(scenes::router())
        .merge(chats::router())
        .merge(discover::router())
        .merge(search::router())
        .merge(metadata::router())
        .merge(uploads::router())
}

fn cors(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "data": { "status": "ok" } }))
}

/// The whole HTTP surface around `state`.
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.is_production())
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.session_idle_minutes,
        )));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api())
        .fallback(middleware::not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(cors(&state.config))
        .layer(session_layer)
        .with_state(state)
}
