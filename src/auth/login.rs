use axum::{debug_handler, extract::State};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    res::Envelope,
    security::verify_password_blocking,
    session::{SessionPayload, Tokens, USER_ID},
    store::{PreferenceStore, Storage},
    validate::{FieldErrors, Validate, Validated},
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginBody {
    identifier: String,
    password: String,
}

impl Validate for LoginBody {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.min_len("identifier", &self.identifier, 3);
        errors.min_len("password", &self.password, 8);
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(storage): State<Storage>,
    State(preferences): State<PreferenceStore>,
    session: Session,
    Validated { body, .. }: Validated<LoginBody>,
) -> AppResult<Envelope<SessionPayload>> {
    let LoginBody { identifier, password } = body;
    let user = if identifier.contains('@') {
        storage.users.get_by_email(&identifier).await?
    } else {
        storage.users.get_by_username(&identifier).await?
    };

    // unknown user and wrong password look the same from outside
    let Some(user) = user else {
        return Err(AppError::unauthorized("Invalid credentials"));
    };
    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    session.cycle_id().await?;
    session.insert(USER_ID, user.id).await?;

    let payload = SessionPayload::build(&storage, &preferences, user, Some(Tokens::issue())).await?;
    Ok(Envelope::ok(payload))
}
