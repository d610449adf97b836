use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use serde::Serialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    models::{Preferences, ProfileMetrics, PublicUser, User},
    security::random_token,
    store::{PreferenceStore, Storage},
    AppError, AppResult,
};

pub const USER_ID: &str = "user_id";

/// The signed-in user, or the first user in the store when nobody signed in.
pub async fn resolve(storage: &Storage, session: &Session) -> AppResult<User> {
    if let Some(user_id) = session.get::<Uuid>(USER_ID).await? {
        if let Some(user) = storage.users.get_by_id(user_id).await? {
            return Ok(user);
        }
    }

    storage
        .users
        .all()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::unauthorized("No authenticated user in demo mode"))
}

pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    Storage: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::internal(anyhow::anyhow!(msg)))?;
        let storage = Storage::from_ref(state);
        Ok(Self(resolve(&storage, &session).await?))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl Tokens {
    /// Placeholders until real token auth exists.
    pub fn issue() -> Self {
        Self {
            access_token: random_token(32),
            refresh_token: random_token(48),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionPayload {
    pub user: PublicUser,
    pub metrics: Option<ProfileMetrics>,
    pub preferences: Preferences,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Tokens>,
}

impl SessionPayload {
    pub async fn build(
        storage: &Storage,
        preferences: &PreferenceStore,
        user: User,
        tokens: Option<Tokens>,
    ) -> AppResult<Self> {
        Ok(Self {
            metrics: storage.profile_metrics.get_by_user_id(user.id).await?,
            preferences: preferences.get(user.id)?,
            user: user.into(),
            tokens,
        })
    }
}
