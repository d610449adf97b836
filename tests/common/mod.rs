#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use rolesim::{
    config::Config,
    store::{demo_seed, Storage},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub fn test_app() -> Router {
    let seed = demo_seed().expect("demo seed");
    rolesim::app(AppState::new(Storage::in_memory(seed), Config::default()))
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("request");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

/// Like [`send`], also returning the `name=value` part of any `Set-Cookie`.
pub async fn send_for_cookie(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(req).await.expect("request");
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_owned);
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    (status, cookie, serde_json::from_slice(&bytes).expect("json body"))
}

pub fn with_cookie(mut req: Request<Body>, cookie: &str) -> Request<Body> {
    req.headers_mut()
        .insert(header::COOKIE, cookie.parse().expect("cookie header"));
    req
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    with_json(Method::POST, uri, &body)
}

pub fn patch_json(uri: &str, body: Value) -> Request<Body> {
    with_json(Method::PATCH, uri, &body)
}

/// First public scene in the demo data.
pub async fn seeded_scene(app: &Router) -> Value {
    let (status, body) = send(app, get("/api/scenes")).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["items"][0].clone()
}

/// Starts a chat on the seeded scene and returns it.
pub async fn start_chat(app: &Router) -> Value {
    let scene = seeded_scene(app).await;
    let (status, body) = send(app, post_json("/api/chats", serde_json::json!({ "sceneId": scene["id"] }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["chat"].clone()
}
