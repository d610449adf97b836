use axum::{debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{ProfileMetrics, PublicUser},
    res::Envelope,
    store::Storage,
    validate::{Skip, Validate, Validated},
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserParams {
    user_id: Uuid,
}

impl Validate for UserParams {}

#[derive(Debug, Serialize)]
pub(crate) struct Profile {
    user: PublicUser,
    metrics: Option<ProfileMetrics>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn user(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, UserParams>,
) -> AppResult<Envelope<Profile>> {
    let Some(user) = storage.users.get_by_id(params.user_id).await? else {
        return Err(AppError::not_found("User not found"));
    };
    let metrics = storage.profile_metrics.get_by_user_id(user.id).await?;

    Ok(Envelope::ok(Profile { user: user.into(), metrics }))
}
