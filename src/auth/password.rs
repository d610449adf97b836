use axum::{debug_handler, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    res::{Envelope, Success, SUCCESS},
    store::Storage,
    validate::{FieldErrors, Validate, Validated},
    AppResult, AppState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct ResetRequestBody {
    email: String,
}

impl Validate for ResetRequestBody {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.email("email", &self.email);
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetBody {
    token: String,
    new_password: String,
}

impl Validate for ResetBody {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.min_len("token", &self.token, 10);
        errors.min_len("newPassword", &self.new_password, 8);
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Delivery {
    delivered: bool,
}

/// Answers the same whether or not the address has an account.
#[debug_handler(state = AppState)]
pub(crate) async fn reset_request(
    State(storage): State<Storage>,
    Validated { body, .. }: Validated<ResetRequestBody>,
) -> AppResult<Envelope<Delivery>> {
    if storage.users.get_by_email(&body.email).await?.is_some() {
        tracing::debug!("password reset requested for a known account");
    }
    Ok(Envelope::accepted(Delivery { delivered: true }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn reset(_: Validated<ResetBody>) -> AppResult<Envelope<Success>> {
    tracing::debug!("password reset accepted");
    Ok(Envelope::ok(SUCCESS))
}
