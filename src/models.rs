use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Unlisted,
    Private,
}

/// Stored account. Never serialized directly; responses go through [`PublicUser`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        let User {
            id,
            email,
            username,
            password_hash: _,
            avatar_url,
            bio,
            created_at,
            updated_at,
        } = user;
        Self {
            id,
            email,
            username,
            avatar_url,
            bio,
            created_at,
            updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// `Some(None)` clears a nullable column, `None` leaves it alone.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub bio: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMetrics {
    pub user_id: Uuid,
    pub total_chats: u32,
    pub scenes_created: u32,
    pub hours_practiced: u32,
    pub streak_days: u32,
    pub badges: Vec<String>,
}

impl ProfileMetrics {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            total_chats: 0,
            scenes_created: 0,
            hours_practiced: 0,
            streak_days: 0,
            badges: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Greeting {
    pub text: String,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStats {
    pub sessions_completed: u32,
    pub favorites: u32,
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub greetings: Vec<Greeting>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub ai_greeting_enabled: bool,
    pub avatar_url: Option<String>,
    pub stats: CharacterStats,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCharacter {
    pub owner_id: Uuid,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub greetings: Vec<Greeting>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub ai_greeting_enabled: bool,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub greetings: Option<Vec<Greeting>>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub ai_greeting_enabled: Option<bool>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneType {
    AnyCharacter,
    MainCharacter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneAnalytics {
    pub plays: u32,
    pub likes: u32,
    pub bookmarks: u32,
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(rename = "type")]
    pub scene_type: SceneType,
    pub genres: Vec<String>,
    pub time_periods: Vec<String>,
    pub locations: Vec<String>,
    pub tones: Vec<String>,
    pub backstory: String,
    pub player_goal: String,
    pub intro_text: String,
    pub character_greeting: String,
    pub name: String,
    pub cover_image_url: Option<String>,
    pub chat_theme_color: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub status: SceneStatus,
    pub linked_character_id: Option<Uuid>,
    pub analytics: SceneAnalytics,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewScene {
    pub owner_id: Uuid,
    pub scene_type: SceneType,
    pub genres: Vec<String>,
    pub time_periods: Vec<String>,
    pub locations: Vec<String>,
    pub tones: Vec<String>,
    pub backstory: String,
    pub player_goal: String,
    pub intro_text: String,
    pub character_greeting: String,
    pub name: String,
    pub cover_image_url: Option<String>,
    pub chat_theme_color: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub status: SceneStatus,
    pub linked_character_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct ScenePatch {
    pub scene_type: Option<SceneType>,
    pub genres: Option<Vec<String>>,
    pub time_periods: Option<Vec<String>>,
    pub locations: Option<Vec<String>>,
    pub tones: Option<Vec<String>>,
    pub backstory: Option<String>,
    pub player_goal: Option<String>,
    pub intro_text: Option<String>,
    pub character_greeting: Option<String>,
    pub name: Option<String>,
    pub cover_image_url: Option<String>,
    pub chat_theme_color: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub status: Option<SceneStatus>,
    pub linked_character_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Active,
    Archived,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettings {
    pub preferred_voice: Option<String>,
    pub ai_feedback_on: bool,
    pub auto_save_on: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            preferred_voice: None,
            ai_feedback_on: true,
            auto_save_on: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub scene_id: Uuid,
    pub character_id: Option<Uuid>,
    pub title: String,
    pub status: ChatStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_activity_at: OffsetDateTime,
    pub settings: ChatSettings,
}

#[derive(Debug, Clone)]
pub struct NewChat {
    pub user_id: Uuid,
    pub scene_id: Uuid,
    pub character_id: Option<Uuid>,
    pub title: String,
    pub settings: ChatSettings,
}

#[derive(Debug, Clone, Default)]
pub struct ChatPatch {
    pub title: Option<String>,
    pub status: Option<ChatStatus>,
    pub settings: Option<ChatSettings>,
    pub last_activity_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeState {
    Like,
    Dislike,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MessageMetadata {
    pub sentiment: Option<String>,
    pub tone: Option<String>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender: Sender,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub like_state: LikeState,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub chat_id: Uuid,
    pub sender: Sender,
    pub body: String,
    pub metadata: Option<MessageMetadata>,
}

#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub like_state: Option<LikeState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReference {
    pub upload_id: Uuid,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUpload {
    pub url: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub email_notifications: bool,
    pub ai_feedback_on: bool,
    pub auto_save_on: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            email_notifications: false,
            ai_feedback_on: true,
            auto_save_on: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PreferencesPatch {
    pub email_notifications: Option<bool>,
    pub ai_feedback_on: Option<bool>,
    pub auto_save_on: Option<bool>,
}
