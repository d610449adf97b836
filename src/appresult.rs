use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use serde_json::Value;

use crate::{store::StoreError, validate::FieldErrors};

pub type AppResult<T> = Result<T, AppError>;

static LOG_BACKTRACES: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Whether 5xx logs carry the error's backtrace. Off in production.
pub fn log_backtraces(enabled: bool) {
    LOG_BACKTRACES.store(enabled, Ordering::Relaxed);
}

fn backtraces_enabled() -> bool {
    LOG_BACKTRACES.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ValidationError,
    NotImplemented,
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        use ErrorCode::*;
        match self {
            BadRequest => "BAD_REQUEST",
            Unauthorized => "UNAUTHORIZED",
            Forbidden => "FORBIDDEN",
            NotFound => "NOT_FOUND",
            Conflict => "CONFLICT",
            ValidationError => "VALIDATION_ERROR",
            NotImplemented => "NOT_IMPLEMENTED",
            InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every failure a handler can surface. Rendered as
/// `{ "error": { "code", "message", "details" } }` with `status`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Value>,
    source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ErrorCode::Conflict, message)
    }

    pub fn validation(message: impl Into<String>, errors: FieldErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or(Value::Null);
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
            .with_details(details)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_IMPLEMENTED, ErrorCode::NotImplemented, message)
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: ErrorCode::InternalServerError,
            message: err.to_string(),
            details: None,
            source: Some(err),
        }
    }

    /// Store errors that mean something to the client: a vanished row is a
    /// 404, a unique-key clash a 409. Anything else is a 500.
    pub fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, .. } => Self::not_found(format!("{} not found", capitalize(entity))),
            StoreError::Duplicate { field, .. } => Self::conflict(format!("{} already in use", capitalize(field))),
            err => err.into(),
        }
    }

    fn log(&self) {
        let status = self.status.as_u16();
        if self.status.is_server_error() {
            match &self.source {
                Some(err) if backtraces_enabled() => tracing::error!(
                    code = %self.code, status, "{}\n{}", self.message, err.backtrace()
                ),
                _ => tracing::error!(code = %self.code, status, "{}", self.message),
            }
        } else {
            tracing::warn!(code = %self.code, status, "{}", self.message);
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.status.as_u16(), self.message)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorPayload<'a>,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    code: ErrorCode,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let body = ErrorBody {
            error: ErrorPayload {
                code: self.code,
                message: &self.message,
                details: self.details.as_ref(),
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::internal(err.into())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use uuid::Uuid;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::not_found("x").status, StatusCode::NOT_FOUND);
        assert_eq!(AppError::unauthorized("x").status, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").status, StatusCode::FORBIDDEN);
        assert_eq!(AppError::conflict("x").status, StatusCode::CONFLICT);
        assert_eq!(AppError::not_implemented("x").status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(
            AppError::validation("x", FieldErrors::default()).status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unclassified_errors_become_internal() {
        let err: AppError = StoreError::Poisoned("users").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, ErrorCode::InternalServerError);
        assert!(err.message.contains("users"));
    }

    #[test]
    fn test_store_errors_map_to_client_errors() {
        let missing = StoreError::NotFound { entity: "chat session", id: Uuid::now_v7() };
        let err = AppError::from_store(missing);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Chat session not found");

        let taken = StoreError::Duplicate { field: "username", value: "stagehand".to_owned() };
        let err = AppError::from_store(taken);
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "Username already in use");

        let err = AppError::from_store(StoreError::Poisoned("message"));
        assert_eq!(err.code, ErrorCode::InternalServerError);
    }

    #[test]
    fn test_backtrace_switch() {
        log_backtraces(false);
        assert!(!backtraces_enabled());
        log_backtraces(true);
        assert!(backtraces_enabled());
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let (status, body) = render(AppError::conflict("Email already in use")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(body["error"]["message"], "Email already in use");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_details_are_rendered() {
        let mut errors = FieldErrors::default();
        errors.add("email", "Invalid email");
        let (status, body) = render(AppError::validation("Validation failed", errors)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["fieldErrors"]["email"][0], "Invalid email");
    }
}
