use axum::{debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    models::{ChatStatus, Preferences, PreferencesPatch, ProfileMetrics, PublicUser, UserPatch},
    res::Envelope,
    session::CurrentUser,
    store::{PreferenceStore, Storage},
    validate::{nullable, FieldErrors, Validate, Validated},
    AppError, AppResult, AppState,
};

const LAST_SESSIONS: usize = 5;

#[derive(Debug, Serialize)]
pub(crate) struct Me {
    user: PublicUser,
    preferences: Preferences,
}

#[debug_handler(state = AppState)]
pub(crate) async fn me(
    State(preferences): State<PreferenceStore>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Envelope<Me>> {
    Ok(Envelope::ok(Me {
        preferences: preferences.get(user.id)?,
        user: user.into(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileBody {
    username: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    avatar_url: Option<Option<String>>,
}

impl Validate for ProfileBody {
    fn validate(&self, errors: &mut FieldErrors) {
        if let Some(username) = &self.username {
            errors.min_len("username", username, 3);
        }
        if let Some(Some(bio)) = &self.bio {
            errors.max_len("bio", bio, 280);
        }
        if let Some(Some(url)) = &self.avatar_url {
            errors.url("avatarUrl", url);
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UserBody {
    user: PublicUser,
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_profile(
    State(storage): State<Storage>,
    CurrentUser(user): CurrentUser,
    Validated { body, .. }: Validated<ProfileBody>,
) -> AppResult<Envelope<UserBody>> {
    if let Some(username) = &body.username {
        if let Some(owner) = storage.users.get_by_username(username).await? {
            if owner.id != user.id {
                return Err(AppError::conflict("Username already in use"));
            }
        }
    }

    let patch = UserPatch {
        username: body.username,
        bio: body.bio,
        avatar_url: body.avatar_url,
    };
    let updated = storage
        .users
        .update(user.id, patch)
        .await
        .map_err(AppError::from_store)?;

    Ok(Envelope::ok(UserBody { user: updated.into() }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionSummary {
    id: Uuid,
    title: String,
    #[serde(with = "time::serde::rfc3339")]
    last_activity_at: OffsetDateTime,
    status: ChatStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Activity {
    metrics: Option<ProfileMetrics>,
    last_sessions: Vec<SessionSummary>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn activity(
    State(storage): State<Storage>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Envelope<Activity>> {
    let metrics = storage.profile_metrics.get_by_user_id(user.id).await?;
    let last_sessions = storage
        .chats
        .list_recent_by_user(user.id)
        .await?
        .into_iter()
        .take(LAST_SESSIONS)
        .map(|chat| SessionSummary {
            id: chat.id,
            title: chat.title,
            last_activity_at: chat.last_activity_at,
            status: chat.status,
        })
        .collect();

    Ok(Envelope::ok(Activity { metrics, last_sessions }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PreferencesBody {
    email_notifications: Option<bool>,
    ai_feedback_on: Option<bool>,
    auto_save_on: Option<bool>,
}

impl Validate for PreferencesBody {}

#[derive(Debug, Serialize)]
pub(crate) struct PreferencesResponse {
    preferences: Preferences,
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_preferences(
    State(preferences): State<PreferenceStore>,
    CurrentUser(user): CurrentUser,
    Validated { body, .. }: Validated<PreferencesBody>,
) -> AppResult<Envelope<PreferencesResponse>> {
    let patch = PreferencesPatch {
        email_notifications: body.email_notifications,
        ai_feedback_on: body.ai_feedback_on,
        auto_save_on: body.auto_save_on,
    };
    Ok(Envelope::ok(PreferencesResponse {
        preferences: preferences.update(user.id, patch)?,
    }))
}
