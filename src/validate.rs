//! Request validation.
//!
//! [`Validated`] parses the JSON body, then the query string, then the path
//! parameters, each into its own schema type, and rejects the request with a
//! `VALIDATION_ERROR` at the first target that fails. A slot typed [`Skip`]
//! is left untouched.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, RawPathParams, Request},
    http::{StatusCode, Uri},
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::appresult::{AppError, ErrorCode};

/// Flattened error breakdown, `{ formErrors, fieldErrors }` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.add(field, format!("Must contain at least {min} character(s)"));
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("Must contain at most {max} character(s)"));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !is_email(value) {
            self.add(field, "Invalid email");
        }
    }

    pub fn url(&mut self, field: &str, value: &str) {
        if !is_url(value) {
            self.add(field, "Invalid url");
        }
    }

    /// Turns a serde message into field errors where the field is known.
    fn from_serde(message: &str) -> Self {
        let mut errors = Self::default();
        match missing_field(message) {
            Some(field) => errors.add(field, "Required"),
            None => errors.form_errors.push(message.to_owned()),
        }
        errors
    }
}

fn missing_field(message: &str) -> Option<&str> {
    let rest = message.split("missing field `").nth(1)?;
    rest.split('`').next().filter(|field| !field.is_empty())
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn is_url(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once("://") else {
        return false;
    };
    matches!(scheme, "http" | "https")
        && !rest.is_empty()
        && !rest.starts_with('/')
        && !value.chars().any(char::is_whitespace)
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
/// Pair with `#[serde(default)]`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A request schema: serde handles shape and defaults, `validate` the rules.
pub trait Validate: DeserializeOwned + Send {
    fn validate(&self, _errors: &mut FieldErrors) {}
}

/// Placeholder for a target that is not validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Skip;

pub trait Slot: Sized + Send {
    const SKIP: bool;

    fn from_json(value: Value) -> Result<Self, FieldErrors>;
    fn from_query(uri: &Uri) -> Result<Self, FieldErrors>;
}

impl Slot for Skip {
    const SKIP: bool = true;

    fn from_json(_: Value) -> Result<Self, FieldErrors> {
        Ok(Skip)
    }

    fn from_query(_: &Uri) -> Result<Self, FieldErrors> {
        Ok(Skip)
    }
}

fn checked<T: Validate>(value: T) -> Result<T, FieldErrors> {
    let mut errors = FieldErrors::default();
    value.validate(&mut errors);
    if errors.is_empty() { Ok(value) } else { Err(errors) }
}

impl<T: Validate> Slot for T {
    const SKIP: bool = false;

    fn from_json(value: Value) -> Result<Self, FieldErrors> {
        let parsed = serde_json::from_value(value)
            .map_err(|err| FieldErrors::from_serde(&err.to_string()))?;
        checked(parsed)
    }

    fn from_query(uri: &Uri) -> Result<Self, FieldErrors> {
        let Query(parsed) =
            Query::try_from_uri(uri).map_err(|err| FieldErrors::from_serde(&err.body_text()))?;
        checked(parsed)
    }
}

/// A `/{id}` path segment.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdParam {
    pub id: Uuid,
}

impl Validate for IdParam {}

#[derive(Debug)]
pub struct Validated<B = Skip, Q = Skip, P = Skip> {
    pub body: B,
    pub query: Q,
    pub params: P,
}

fn invalid(errors: FieldErrors) -> AppError {
    AppError::validation("Validation failed", errors)
}

async fn read_json<S: Send + Sync>(req: Request, state: &S) -> Result<Value, AppError> {
    let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::new(StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::BadRequest, "Request body too large")
        } else {
            AppError::bad_request(rejection.body_text())
        }
    })?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(&bytes).map_err(|err| {
        let mut errors = FieldErrors::default();
        errors.form_errors.push(format!("Malformed JSON body: {err}"));
        invalid(errors)
    })
}

impl<S, B, Q, P> FromRequest<S> for Validated<B, Q, P>
where
    S: Send + Sync,
    B: Slot,
    Q: Slot,
    P: Slot,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let uri = parts.uri.clone();
        let raw_params = if P::SKIP {
            Map::new()
        } else {
            let raw = RawPathParams::from_request_parts(&mut parts, state)
                .await
                .map_err(|rejection| AppError::internal(anyhow::anyhow!(rejection.body_text())))?;
            raw.iter()
                .map(|(key, value)| (key.to_owned(), Value::String(value.to_owned())))
                .collect()
        };

        let body = if B::SKIP {
            B::from_json(Value::Null)
        } else {
            B::from_json(read_json(Request::from_parts(parts, body), state).await?)
        }
        .map_err(invalid)?;
        let query = Q::from_query(&uri).map_err(invalid)?;
        let params = P::from_json(Value::Object(raw_params)).map_err(invalid)?;

        Ok(Self { body, query, params })
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, routing::post, Json, Router};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Signup {
        email: String,
        #[serde(default)]
        nickname: String,
    }

    impl Validate for Signup {
        fn validate(&self, errors: &mut FieldErrors) {
            errors.email("email", &self.email);
        }
    }

    #[derive(Debug, Deserialize)]
    struct Paging {
        limit: Option<u32>,
    }

    impl Validate for Paging {
        fn validate(&self, errors: &mut FieldErrors) {
            if self.limit == Some(0) {
                errors.add("limit", "Must be positive");
            }
        }
    }

    #[derive(Debug, Deserialize)]
    struct Path {
        id: Uuid,
    }

    impl Validate for Path {}

    async fn echo(Validated { body, query, params }: Validated<Signup, Paging, Path>) -> Json<Value> {
        Json(serde_json::json!({
            "email": body.email,
            "nickname": body.nickname,
            "limit": query.limit,
            "id": params.id,
        }))
    }

    async fn send(uri: &str, body: &str) -> (StatusCode, Value) {
        let app = Router::new().route("/items/{id}", post(echo));
        let req = axum::http::Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_length_rules_count_chars() {
        let mut errors = FieldErrors::default();
        errors.min_len("name", "äöü", 3);
        errors.max_len("bio", "äöü", 3);
        assert!(errors.is_empty());

        errors.min_len("name", "ab", 3);
        errors.max_len("bio", "abcd", 3);
        assert_eq!(errors.field_errors.len(), 2);
    }

    #[test]
    fn test_email_shape() {
        for ok in ["a@b.co", "first.last@mail.example.com"] {
            assert!(is_email(ok), "{ok}");
        }
        for bad in ["", "plain", "@b.co", "a@b", "a@.co", "a b@c.co", "a@b@c.co", "a@b."] {
            assert!(!is_email(bad), "{bad}");
        }
    }

    #[test]
    fn test_url_shape() {
        assert!(is_url("https://cdn.example.com/a.png"));
        assert!(is_url("http://localhost:5000"));
        assert!(!is_url("ftp://example.com"));
        assert!(!is_url("https://"));
        assert!(!is_url("example.com/a.png"));
    }

    #[test]
    fn test_missing_field_is_attributed() {
        let errors = FieldErrors::from_serde("missing field `sceneId` at line 1 column 2");
        assert_eq!(errors.field_errors["sceneId"], vec!["Required".to_owned()]);

        let errors = FieldErrors::from_serde("invalid type: integer `3`, expected a string");
        assert!(errors.field_errors.is_empty());
        assert_eq!(errors.form_errors.len(), 1);
    }

    #[test]
    fn test_serialized_shape() {
        let mut errors = FieldErrors::default();
        errors.add("username", "Too short");
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value["formErrors"], serde_json::json!([]));
        assert_eq!(value["fieldErrors"]["username"][0], "Too short");
    }

    #[test]
    fn test_nullable_distinguishes_null() {
        #[derive(Deserialize)]
        struct Patch {
            #[serde(default, deserialize_with = "nullable")]
            bio: Option<Option<String>>,
        }

        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"bio":null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"bio":"hi"}"#).unwrap();
        assert_eq!(absent.bio, None);
        assert_eq!(null.bio, Some(None));
        assert_eq!(set.bio, Some(Some("hi".to_owned())));
    }

    #[tokio::test]
    async fn test_all_targets_parse() {
        let id = Uuid::now_v7();
        let (status, body) = send(&format!("/items/{id}?limit=5"), r#"{"email":"a@b.co"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nickname"], "");
        assert_eq!(body["limit"], 5);
        assert_eq!(body["id"], id.to_string());
    }

    #[tokio::test]
    async fn test_body_fails_before_query_and_params() {
        let (status, body) = send("/items/not-a-uuid?limit=0", r#"{"email":"nope"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        let fields = body["error"]["details"]["fieldErrors"].as_object().unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["email"]);
    }

    #[tokio::test]
    async fn test_query_fails_before_params() {
        let (status, body) = send("/items/not-a-uuid?limit=0", r#"{"email":"a@b.co"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["details"]["fieldErrors"]["limit"].is_array());
    }

    #[tokio::test]
    async fn test_malformed_id_is_a_validation_error() {
        let (status, body) = send("/items/not-a-uuid", r#"{"email":"a@b.co"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_empty_and_malformed_bodies() {
        let id = Uuid::now_v7();
        let (status, body) = send(&format!("/items/{id}"), "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["fieldErrors"]["email"][0], "Required");

        let (status, body) = send(&format!("/items/{id}"), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["formErrors"].as_array().unwrap().len(), 1);
    }
}
