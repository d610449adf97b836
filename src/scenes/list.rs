use axum::{debug_handler, extract::State};

use crate::{
    listing::ListQuery,
    models::Scene,
    res::{self, Envelope, Items},
    session::CurrentUser,
    store::Storage,
    validate::{Skip, Validated},
    AppResult, AppState,
};

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    State(storage): State<Storage>,
    Validated { query, .. }: Validated<Skip, ListQuery>,
) -> AppResult<Envelope<Items<Scene>>> {
    let filter = query.into_filter(&storage).await?;
    let scenes = storage
        .scenes
        .list_public()
        .await?
        .into_iter()
        .filter(|s| filter.matches(s.owner_id, &s.tags))
        .collect();
    Ok(res::list(scenes))
}

#[debug_handler(state = AppState)]
pub(crate) async fn mine(
    State(storage): State<Storage>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Envelope<Items<Scene>>> {
    Ok(res::list(storage.scenes.list_by_owner(user.id).await?))
}
