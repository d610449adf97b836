use std::sync::Arc;

use axum::{debug_handler, extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    config::Config,
    models::{NewUpload, UploadReference},
    res::Envelope,
    store::Storage,
    validate::{FieldErrors, Validate, Validated},
    AppResult, AppState,
};

const UPLOAD_TTL: Duration = Duration::minutes(10);

pub fn router() -> Router<AppState> {
    Router::new().route("/uploads", post(create))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadBody {
    filename: String,
    mime_type: String,
}

impl Validate for UploadBody {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.min_len("filename", &self.filename, 1);
        errors.min_len("mimeType", &self.mime_type, 1);
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Fields {
    key: String,
    #[serde(rename = "Content-Type")]
    content_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Issued {
    upload: UploadReference,
    fields: Fields,
}

/// Percent-encodes everything outside the URI component unreserved set.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9'
            | b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Issues a short-lived upload slot. The client posts the file to `url`
/// with `fields` attached.
#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(storage): State<Storage>,
    State(config): State<Arc<Config>>,
    Validated { body, .. }: Validated<UploadBody>,
) -> AppResult<Envelope<Issued>> {
    let url = format!("{}/{}", config.upload_base_url, encode_component(&body.filename));
    let upload = storage
        .uploads
        .create_upload(NewUpload {
            url,
            expires_at: OffsetDateTime::now_utc() + UPLOAD_TTL,
        })
        .await?;

    Ok(Envelope::ok(Issued {
        upload,
        fields: Fields {
            key: body.filename,
            content_type: body.mime_type,
        },
    }))
}
