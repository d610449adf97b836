use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::AppError;

const MAX_LOG_LINE: usize = 80;

/// Logs every `/api` request as `METHOD PATH STATUS in Nms :: <body>`.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    if !path.starts_with("/api") {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().clone();
    let response = next.run(req).await;
    let elapsed = start.elapsed().as_millis();

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(%method, path, "failed to buffer response body: {err}");
            return AppError::internal(err.into()).into_response();
        }
    };

    let mut line = format!("{method} {path} {} in {elapsed}ms", parts.status.as_u16());
    if !bytes.is_empty() {
        line.push_str(" :: ");
        line.push_str(&String::from_utf8_lossy(&bytes));
    }
    tracing::info!(target: "rolesim::router", "{}", truncate(&line));

    Response::from_parts(parts, Body::from(bytes))
}

fn truncate(line: &str) -> String {
    if line.chars().count() <= MAX_LOG_LINE {
        return line.to_owned();
    }
    let mut short: String = line.chars().take(MAX_LOG_LINE - 1).collect();
    short.push('…');
    short
}

pub async fn not_found() -> AppError {
    AppError::not_found("Route not found")
}
