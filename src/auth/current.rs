use axum::{debug_handler, extract::State};

use crate::{
    res::Envelope,
    session::{CurrentUser, SessionPayload},
    store::{PreferenceStore, Storage},
    AppResult, AppState,
};

#[debug_handler(state = AppState)]
pub(crate) async fn session(
    State(storage): State<Storage>,
    State(preferences): State<PreferenceStore>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Envelope<SessionPayload>> {
    let payload = SessionPayload::build(&storage, &preferences, user, None).await?;
    Ok(Envelope::ok(payload))
}
