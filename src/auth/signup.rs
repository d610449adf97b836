use axum::{debug_handler, extract::State};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    models::{NewUser, ProfileMetrics},
    res::Envelope,
    security::hash_password_blocking,
    session::{SessionPayload, Tokens, USER_ID},
    store::{PreferenceStore, Storage},
    validate::{FieldErrors, Validate, Validated},
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignupBody {
    email: String,
    username: String,
    password: String,
    #[serde(default)]
    marketing_opt_in: bool,
}

impl Validate for SignupBody {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.email("email", &self.email);
        errors.min_len("username", &self.username, 3);
        errors.min_len("password", &self.password, 8);
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn signup(
    State(storage): State<Storage>,
    State(preferences): State<PreferenceStore>,
    session: Session,
    Validated { body, .. }: Validated<SignupBody>,
) -> AppResult<Envelope<SessionPayload>> {
    if storage.users.get_by_email(&body.email).await?.is_some() {
        return Err(AppError::conflict("Email already in use"));
    }
    if storage.users.get_by_username(&body.username).await?.is_some() {
        return Err(AppError::conflict("Username already in use"));
    }

    let password_hash = hash_password_blocking(body.password).await?;
    let user = storage
        .users
        .insert(NewUser {
            email: body.email,
            username: body.username,
            password_hash,
            avatar_url: None,
            bio: None,
        })
        .await
        .map_err(AppError::from_store)?;
    storage.profile_metrics.upsert(ProfileMetrics::empty(user.id)).await?;

    session.cycle_id().await?;
    session.insert(USER_ID, user.id).await?;
    tracing::info!(user_id = %user.id, marketing_opt_in = body.marketing_opt_in, "new account");

    let payload = SessionPayload::build(&storage, &preferences, user, Some(Tokens::issue())).await?;
    Ok(Envelope::created(payload))
}
