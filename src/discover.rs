use axum::{debug_handler, extract::State, routing::get, Router};
use serde::Serialize;
use tower_sessions::Session;

use crate::{
    models::{Character, ChatSession, Scene},
    res::Envelope,
    session,
    store::Storage,
    AppResult, AppState,
};

const FOR_YOU: usize = 6;
const FEATURED: usize = 6;
const RECENTS: usize = 3;

pub fn router() -> Router<AppState> {
    Router::new().route("/discover/overview", get(overview))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Overview {
    for_you: Vec<Character>,
    featured_scenes: Vec<Scene>,
    popular_collections: Vec<Scene>,
    recents: Vec<ChatSession>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn overview(
    State(storage): State<Storage>,
    session: Session,
) -> AppResult<Envelope<Overview>> {
    let mut for_you = storage.characters.list_public().await?;
    for_you.truncate(FOR_YOU);
    let mut featured_scenes = storage.scenes.list_public().await?;
    featured_scenes.truncate(FEATURED);

    // anonymous visitors still get the feed
    let recents = match session::resolve(&storage, &session).await {
        Ok(user) => {
            let mut chats = storage.chats.list_recent_by_user(user.id).await?;
            chats.truncate(RECENTS);
            chats
        }
        Err(_) => Vec::new(),
    };

    Ok(Envelope::ok(Overview {
        for_you,
        featured_scenes,
        popular_collections: storage.collections.list_popular().await?,
        recents,
    }))
}
