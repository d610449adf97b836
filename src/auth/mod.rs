mod current;
mod login;
mod logout;
mod password;
mod signup;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup::signup))
        .route("/auth/login", post(login::login))
        .route("/auth/logout", post(logout::logout))
        .route("/auth/session", get(current::session))
        .route("/auth/password/reset-request", post(password::reset_request))
        .route("/auth/password/reset", post(password::reset))
}
