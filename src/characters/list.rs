use axum::{debug_handler, extract::State};

use crate::{
    listing::ListQuery,
    models::Character,
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
) -> AppResult<Envelope<Items<Character>>> {
    let filter = query.into_filter(&storage).await?;
    let characters = storage
        .characters
        .list_public()
        .await?
        .into_iter()
        .filter(|c| filter.matches(c.owner_id, &c.tags))
        .collect();
    Ok(res::list(characters))
}

/// Everything the current user owns, whatever its visibility.
#[debug_handler(state = AppState)]
pub(crate) async fn mine(
    State(storage): State<Storage>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Envelope<Items<Character>>> {
    Ok(res::list(storage.characters.list_by_owner(user.id).await?))
}
