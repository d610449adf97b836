//! Repository contracts, one per entity, and the [`Storage`] bundle handed to
//! route handlers.
//!
//! Every repository hands out owned copies. Mutating a returned value never
//! touches stored state; a single call is atomic, a sequence of calls is not.

mod fixtures;
mod memory;
mod pins;
mod preferences;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Character, CharacterPatch, ChatPatch, ChatSession, Message, MessagePatch, NewCharacter,
    NewChat, NewMessage, NewScene, NewUpload, NewUser, ProfileMetrics, Scene, ScenePatch,
    UploadReference, User, UserPatch,
};

pub use fixtures::{demo_seed, DEMO_EMAIL, DEMO_PASSWORD, DEMO_USERNAME};
pub use memory::Seed;
pub use pins::PinStore;
pub use preferences::PreferenceStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("{field} {value:?} is already taken")]
    Duplicate { field: &'static str, value: String },
    #[error("{0} store lock poisoned")]
    Poisoned(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn get_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Fails with [`StoreError::Duplicate`] when the email or username exists.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
    async fn update(&self, id: Uuid, patch: UserPatch) -> StoreResult<User>;
    async fn all(&self) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait ProfileMetricsRepository: Send + Sync {
    async fn get_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<ProfileMetrics>>;
    async fn upsert(&self, metrics: ProfileMetrics) -> StoreResult<ProfileMetrics>;
}

#[async_trait]
pub trait CharacterRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Character>>;
    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Character>>;
    async fn list_public(&self) -> StoreResult<Vec<Character>>;
    async fn insert(&self, character: NewCharacter) -> StoreResult<Character>;
    async fn update(&self, id: Uuid, patch: CharacterPatch) -> StoreResult<Character>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait SceneRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Scene>>;
    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Scene>>;
    async fn list_public(&self) -> StoreResult<Vec<Scene>>;
    async fn insert(&self, scene: NewScene) -> StoreResult<Scene>;
    async fn update(&self, id: Uuid, patch: ScenePatch) -> StoreResult<Scene>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<ChatSession>>;
    /// Newest `last_activity_at` first.
    async fn list_recent_by_user(&self, user_id: Uuid) -> StoreResult<Vec<ChatSession>>;
    async fn insert(&self, chat: NewChat) -> StoreResult<ChatSession>;
    /// Bumps `last_activity_at` to the patch value or now, never backwards.
    async fn update(&self, id: Uuid, patch: ChatPatch) -> StoreResult<ChatSession>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Message>>;
    /// Oldest first, truncated to the first `limit` when given.
    async fn list_by_chat_id(&self, chat_id: Uuid, limit: Option<usize>) -> StoreResult<Vec<Message>>;
    async fn insert(&self, message: NewMessage) -> StoreResult<Message>;
    async fn update(&self, id: Uuid, patch: MessagePatch) -> StoreResult<Message>;
}

#[async_trait]
pub trait UploadRepository: Send + Sync {
    async fn create_upload(&self, upload: NewUpload) -> StoreResult<UploadReference>;
    async fn get_by_id(&self, upload_id: Uuid) -> StoreResult<Option<UploadReference>>;
}

#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn list_featured(&self) -> StoreResult<Vec<Scene>>;
    async fn list_popular(&self) -> StoreResult<Vec<Scene>>;
}

#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub profile_metrics: Arc<dyn ProfileMetricsRepository>,
    pub characters: Arc<dyn CharacterRepository>,
    pub scenes: Arc<dyn SceneRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub uploads: Arc<dyn UploadRepository>,
    pub collections: Arc<dyn CollectionRepository>,
}

impl Storage {
    pub fn in_memory(seed: Seed) -> Self {
        memory::build(seed)
    }

    /// Resolves an upload id to the URL it was issued for.
    pub async fn resolve_upload(&self, upload_id: Option<Uuid>) -> StoreResult<Option<String>> {
        let Some(upload_id) = upload_id else {
            return Ok(None);
        };
        Ok(self.uploads.get_by_id(upload_id).await?.map(|upload| upload.url))
    }
}
