use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{
    Character, CharacterPatch, CharacterStats, ChatPatch, ChatSession, ChatStatus, LikeState,
    Message, MessagePatch, NewCharacter, NewChat, NewMessage, NewScene, NewUpload, NewUser,
    ProfileMetrics, Scene, SceneAnalytics, ScenePatch, UploadReference, User, UserPatch,
    Visibility,
};

use super::{
    CharacterRepository, ChatRepository, CollectionRepository, MessageRepository,
    ProfileMetricsRepository, SceneRepository, Storage, StoreError, StoreResult,
    UploadRepository, UserRepository,
};

/// Rows loaded into a fresh store. `Seed::default()` is an empty store.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub users: Vec<User>,
    pub profile_metrics: Vec<ProfileMetrics>,
    pub characters: Vec<Character>,
    pub scenes: Vec<Scene>,
    pub chats: Vec<ChatSession>,
    pub messages: Vec<Message>,
    pub uploads: Vec<UploadReference>,
    pub featured: Vec<Scene>,
    pub popular: Vec<Scene>,
}

pub(super) fn build(seed: Seed) -> Storage {
    Storage {
        users: Arc::new(InMemoryUserRepository {
            users: Table::new("user", seed.users.into_iter().map(|u| (u.id, u))),
        }),
        profile_metrics: Arc::new(InMemoryProfileMetricsRepository {
            metrics: Table::new(
                "profile metrics",
                seed.profile_metrics.into_iter().map(|m| (m.user_id, m)),
            ),
        }),
        characters: Arc::new(InMemoryCharacterRepository {
            characters: Table::new("character", seed.characters.into_iter().map(|c| (c.id, c))),
        }),
        scenes: Arc::new(InMemorySceneRepository {
            scenes: Table::new("scene", seed.scenes.into_iter().map(|s| (s.id, s))),
        }),
        chats: Arc::new(InMemoryChatRepository {
            chats: Table::new("chat session", seed.chats.into_iter().map(|c| (c.id, c))),
        }),
        messages: Arc::new(InMemoryMessageRepository {
            messages: Table::new("message", seed.messages.into_iter().map(|m| (m.id, m))),
        }),
        uploads: Arc::new(InMemoryUploadRepository {
            uploads: Table::new("upload", seed.uploads.into_iter().map(|u| (u.upload_id, u))),
        }),
        collections: Arc::new(InMemoryCollectionRepository {
            featured: seed.featured,
            popular: seed.popular,
        }),
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// A map guarded by one lock. Keys are v7 uuids, so iteration follows insertion.
struct Table<T> {
    name: &'static str,
    rows: RwLock<BTreeMap<Uuid, T>>,
}

impl<T: Clone> Table<T> {
    fn new(name: &'static str, seed: impl IntoIterator<Item = (Uuid, T)>) -> Self {
        Self {
            name,
            rows: RwLock::new(seed.into_iter().collect()),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<Uuid, T>>> {
        self.rows.read().map_err(|_| StoreError::Poisoned(self.name))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<Uuid, T>>> {
        self.rows.write().map_err(|_| StoreError::Poisoned(self.name))
    }

    fn get(&self, id: Uuid) -> StoreResult<Option<T>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn find(&self, pred: impl Fn(&T) -> bool) -> StoreResult<Option<T>> {
        Ok(self.read()?.values().find(|row| pred(row)).cloned())
    }

    fn filter(&self, pred: impl Fn(&T) -> bool) -> StoreResult<Vec<T>> {
        Ok(self.read()?.values().filter(|row| pred(row)).cloned().collect())
    }

    fn put(&self, id: Uuid, row: T) -> StoreResult<T> {
        self.write()?.insert(id, row.clone());
        Ok(row)
    }

    fn modify(&self, id: Uuid, apply: impl FnOnce(&mut T)) -> StoreResult<T> {
        let mut rows = self.write()?;
        let row = rows
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: self.name, id })?;
        apply(row);
        Ok(row.clone())
    }

    fn remove(&self, id: Uuid) -> StoreResult<()> {
        self.write()?.remove(&id);
        Ok(())
    }
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

struct InMemoryUserRepository {
    users: Table<User>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.users.get(id)
    }

    async fn get_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.users.find(|user| user.username == username)
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.users.find(|user| user.email == email)
    }

    async fn insert(&self, new: NewUser) -> StoreResult<User> {
        let mut users = self.users.write()?;
        for existing in users.values() {
            if existing.email == new.email {
                return Err(StoreError::Duplicate { field: "email", value: new.email });
            }
            if existing.username == new.username {
                return Err(StoreError::Duplicate { field: "username", value: new.username });
            }
        }

        let created_at = now();
        let user = User {
            id: Uuid::now_v7(),
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            avatar_url: new.avatar_url,
            bio: new.bio,
            created_at,
            updated_at: created_at,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> StoreResult<User> {
        let mut users = self.users.write()?;
        if let Some(username) = &patch.username {
            if users.values().any(|u| u.id != id && &u.username == username) {
                return Err(StoreError::Duplicate { field: "username", value: username.clone() });
            }
        }

        let user = users
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: self.users.name, id })?;
        replace(&mut user.username, patch.username);
        replace(&mut user.bio, patch.bio);
        replace(&mut user.avatar_url, patch.avatar_url);
        user.updated_at = now();
        Ok(user.clone())
    }

    async fn all(&self) -> StoreResult<Vec<User>> {
        self.users.filter(|_| true)
    }
}

struct InMemoryProfileMetricsRepository {
    metrics: Table<ProfileMetrics>,
}

#[async_trait]
impl ProfileMetricsRepository for InMemoryProfileMetricsRepository {
    async fn get_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<ProfileMetrics>> {
        self.metrics.get(user_id)
    }

    async fn upsert(&self, metrics: ProfileMetrics) -> StoreResult<ProfileMetrics> {
        self.metrics.put(metrics.user_id, metrics)
    }
}

struct InMemoryCharacterRepository {
    characters: Table<Character>,
}

#[async_trait]
impl CharacterRepository for InMemoryCharacterRepository {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Character>> {
        self.characters.get(id)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Character>> {
        self.characters.filter(|c| c.owner_id == owner_id)
    }

    async fn list_public(&self) -> StoreResult<Vec<Character>> {
        self.characters.filter(|c| c.visibility == Visibility::Public)
    }

    async fn insert(&self, new: NewCharacter) -> StoreResult<Character> {
        let created_at = now();
        let character = Character {
            id: Uuid::now_v7(),
            owner_id: new.owner_id,
            name: new.name,
            tagline: new.tagline,
            description: new.description,
            greetings: new.greetings,
            tags: new.tags,
            visibility: new.visibility,
            ai_greeting_enabled: new.ai_greeting_enabled,
            avatar_url: new.avatar_url,
            stats: CharacterStats {
                sessions_completed: 0,
                favorites: 0,
                rating: None,
            },
            created_at,
            updated_at: created_at,
        };
        self.characters.put(character.id, character)
    }

    async fn update(&self, id: Uuid, patch: CharacterPatch) -> StoreResult<Character> {
        self.characters.modify(id, |c| {
            replace(&mut c.name, patch.name);
            replace(&mut c.tagline, patch.tagline);
            replace(&mut c.description, patch.description);
            replace(&mut c.greetings, patch.greetings);
            replace(&mut c.tags, patch.tags);
            replace(&mut c.visibility, patch.visibility);
            replace(&mut c.ai_greeting_enabled, patch.ai_greeting_enabled);
            if patch.avatar_url.is_some() {
                c.avatar_url = patch.avatar_url;
            }
            c.updated_at = now();
        })
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.characters.remove(id)
    }
}

struct InMemorySceneRepository {
    scenes: Table<Scene>,
}

#[async_trait]
impl SceneRepository for InMemorySceneRepository {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Scene>> {
        self.scenes.get(id)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Scene>> {
        self.scenes.filter(|s| s.owner_id == owner_id)
    }

    async fn list_public(&self) -> StoreResult<Vec<Scene>> {
        self.scenes.filter(|s| s.visibility == Visibility::Public)
    }

    async fn insert(&self, new: NewScene) -> StoreResult<Scene> {
        let created_at = now();
        let scene = Scene {
            id: Uuid::now_v7(),
            owner_id: new.owner_id,
            scene_type: new.scene_type,
            genres: new.genres,
            time_periods: new.time_periods,
            locations: new.locations,
            tones: new.tones,
            backstory: new.backstory,
            player_goal: new.player_goal,
            intro_text: new.intro_text,
            character_greeting: new.character_greeting,
            name: new.name,
            cover_image_url: new.cover_image_url,
            chat_theme_color: new.chat_theme_color,
            tags: new.tags,
            visibility: new.visibility,
            status: new.status,
            linked_character_id: new.linked_character_id,
            analytics: SceneAnalytics {
                plays: 0,
                likes: 0,
                bookmarks: 0,
                rating: None,
            },
            created_at,
            updated_at: created_at,
        };
        self.scenes.put(scene.id, scene)
    }

    async fn update(&self, id: Uuid, patch: ScenePatch) -> StoreResult<Scene> {
        self.scenes.modify(id, |s| {
            replace(&mut s.scene_type, patch.scene_type);
            replace(&mut s.genres, patch.genres);
            replace(&mut s.time_periods, patch.time_periods);
            replace(&mut s.locations, patch.locations);
            replace(&mut s.tones, patch.tones);
            replace(&mut s.backstory, patch.backstory);
            replace(&mut s.player_goal, patch.player_goal);
            replace(&mut s.intro_text, patch.intro_text);
            replace(&mut s.character_greeting, patch.character_greeting);
            replace(&mut s.name, patch.name);
            replace(&mut s.chat_theme_color, patch.chat_theme_color);
            replace(&mut s.tags, patch.tags);
            replace(&mut s.visibility, patch.visibility);
            replace(&mut s.status, patch.status);
            if patch.cover_image_url.is_some() {
                s.cover_image_url = patch.cover_image_url;
            }
            if patch.linked_character_id.is_some() {
                s.linked_character_id = patch.linked_character_id;
            }
            s.updated_at = now();
        })
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.scenes.remove(id)
    }
}

struct InMemoryChatRepository {
    chats: Table<ChatSession>,
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<ChatSession>> {
        self.chats.get(id)
    }

    async fn list_recent_by_user(&self, user_id: Uuid) -> StoreResult<Vec<ChatSession>> {
        let mut chats = self.chats.filter(|c| c.user_id == user_id)?;
        // newer chats win ties
        chats.sort_by(|a, b| (b.last_activity_at, b.id).cmp(&(a.last_activity_at, a.id)));
        Ok(chats)
    }

    async fn insert(&self, new: NewChat) -> StoreResult<ChatSession> {
        let started_at = now();
        let chat = ChatSession {
            id: Uuid::now_v7(),
            user_id: new.user_id,
            scene_id: new.scene_id,
            character_id: new.character_id,
            title: new.title,
            status: ChatStatus::Active,
            started_at,
            last_activity_at: started_at,
            settings: new.settings,
        };
        self.chats.put(chat.id, chat)
    }

    async fn update(&self, id: Uuid, patch: ChatPatch) -> StoreResult<ChatSession> {
        self.chats.modify(id, |c| {
            replace(&mut c.title, patch.title);
            replace(&mut c.status, patch.status);
            replace(&mut c.settings, patch.settings);
            let touched = patch.last_activity_at.unwrap_or_else(now);
            c.last_activity_at = c.last_activity_at.max(touched);
        })
    }
}

struct InMemoryMessageRepository {
    messages: Table<Message>,
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Message>> {
        self.messages.get(id)
    }

    async fn list_by_chat_id(&self, chat_id: Uuid, limit: Option<usize>) -> StoreResult<Vec<Message>> {
        let mut messages = self.messages.filter(|m| m.chat_id == chat_id)?;
        // stable: ties keep id (insertion) order
        messages.sort_by_key(|m| m.created_at);
        if let Some(limit) = limit {
            messages.truncate(limit);
        }
        Ok(messages)
    }

    async fn insert(&self, new: NewMessage) -> StoreResult<Message> {
        let message = Message {
            id: Uuid::now_v7(),
            chat_id: new.chat_id,
            sender: new.sender,
            body: new.body,
            metadata: new.metadata,
            created_at: now(),
            like_state: LikeState::None,
        };
        self.messages.put(message.id, message)
    }

    async fn update(&self, id: Uuid, patch: MessagePatch) -> StoreResult<Message> {
        self.messages.modify(id, |m| replace(&mut m.like_state, patch.like_state))
    }
}

struct InMemoryUploadRepository {
    uploads: Table<UploadReference>,
}

#[async_trait]
impl UploadRepository for InMemoryUploadRepository {
    async fn create_upload(&self, new: NewUpload) -> StoreResult<UploadReference> {
        let upload = UploadReference {
            upload_id: Uuid::now_v7(),
            url: new.url,
            expires_at: new.expires_at,
        };
        self.uploads.put(upload.upload_id, upload)
    }

    async fn get_by_id(&self, upload_id: Uuid) -> StoreResult<Option<UploadReference>> {
        self.uploads.get(upload_id)
    }
}

/// Read-only snapshots taken at seed time.
struct InMemoryCollectionRepository {
    featured: Vec<Scene>,
    popular: Vec<Scene>,
}

#[async_trait]
impl CollectionRepository for InMemoryCollectionRepository {
    async fn list_featured(&self) -> StoreResult<Vec<Scene>> {
        Ok(self.featured.clone())
    }

    async fn list_popular(&self) -> StoreResult<Vec<Scene>> {
        Ok(self.popular.clone())
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::models::{ChatSettings, Greeting, MessageMetadata, SceneStatus, SceneType, Sender};

    fn storage() -> Storage {
        Storage::in_memory(Seed::default())
    }

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_owned(),
            username: username.to_owned(),
            password_hash: "hash".to_owned(),
            avatar_url: None,
            bio: Some("hello".to_owned()),
        }
    }

    fn new_character(owner_id: Uuid, visibility: Visibility) -> NewCharacter {
        NewCharacter {
            owner_id,
            name: "Captain".to_owned(),
            tagline: "Steady under fire".to_owned(),
            description: "Leads the squad".to_owned(),
            greetings: vec![Greeting { text: "At ease.".to_owned(), order: 0 }],
            tags: vec!["military".to_owned()],
            visibility,
            ai_greeting_enabled: true,
            avatar_url: Some("https://cdn.example.com/a.png".to_owned()),
        }
    }

    fn new_chat(user_id: Uuid) -> NewChat {
        NewChat {
            user_id,
            scene_id: Uuid::now_v7(),
            character_id: None,
            title: "Briefing".to_owned(),
            settings: Default::default(),
        }
    }

    fn user_message(chat_id: Uuid, body: &str) -> NewMessage {
        NewMessage {
            chat_id,
            sender: Sender::User,
            body: body.to_owned(),
            metadata: Some(MessageMetadata::default()),
        }
    }

    #[tokio::test]
    async fn test_user_insert_assigns_fresh_ids() {
        let store = storage();
        let a = store.users.insert(new_user("a@example.com", "alpha")).await.unwrap();
        let b = store.users.insert(new_user("b@example.com", "bravo")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(store.users.get_by_email("b@example.com").await.unwrap(), Some(b.clone()));
        assert_eq!(store.users.get_by_username("alpha").await.unwrap(), Some(a));
        assert_eq!(store.users.get_by_id(Uuid::now_v7()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_user_uniqueness_is_enforced() {
        let store = storage();
        store.users.insert(new_user("a@example.com", "alpha")).await.unwrap();

        let err = store.users.insert(new_user("a@example.com", "other")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "email", .. }));

        let err = store.users.insert(new_user("other@example.com", "alpha")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "username", .. }));

        let bravo = store.users.insert(new_user("b@example.com", "bravo")).await.unwrap();
        let patch = UserPatch { username: Some("alpha".to_owned()), ..Default::default() };
        let err = store.users.update(bravo.id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "username", .. }));

        // renaming to your own name is not a conflict
        let patch = UserPatch { username: Some("bravo".to_owned()), ..Default::default() };
        assert!(store.users.update(bravo.id, patch).await.is_ok());
    }

    #[tokio::test]
    async fn test_user_patch_clears_nullable_fields() {
        let store = storage();
        let user = store.users.insert(new_user("a@example.com", "alpha")).await.unwrap();

        let patch = UserPatch { bio: Some(None), ..Default::default() };
        let updated = store.users.update(user.id, patch).await.unwrap();
        assert_eq!(updated.bio, None);
        assert_eq!(updated.username, "alpha");
        assert!(updated.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_a_store_error() {
        let store = storage();
        let id = Uuid::now_v7();

        let err = store.users.update(id, UserPatch::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: missing, .. } if missing == id));
        assert!(store.characters.update(id, CharacterPatch::default()).await.is_err());
        assert!(store.scenes.update(id, ScenePatch::default()).await.is_err());
        assert!(store.chats.update(id, ChatPatch::default()).await.is_err());
        assert!(store.messages.update(id, MessagePatch::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_character_round_trip() {
        let store = storage();
        let owner = Uuid::now_v7();
        let input = new_character(owner, Visibility::Private);
        let created = store.characters.insert(input.clone()).await.unwrap();
        let fetched = store.characters.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.owner_id, input.owner_id);
        assert_eq!(fetched.name, input.name);
        assert_eq!(fetched.tagline, input.tagline);
        assert_eq!(fetched.description, input.description);
        assert_eq!(fetched.greetings, input.greetings);
        assert_eq!(fetched.tags, input.tags);
        assert_eq!(fetched.visibility, input.visibility);
        assert_eq!(fetched.ai_greeting_enabled, input.ai_greeting_enabled);
        assert_eq!(fetched.avatar_url, input.avatar_url);
        assert_eq!(fetched.stats.sessions_completed, 0);
    }

    #[tokio::test]
    async fn test_returned_copies_are_isolated() {
        let store = storage();
        let created = store
            .characters
            .insert(new_character(Uuid::now_v7(), Visibility::Public))
            .await
            .unwrap();

        let mut fetched = store.characters.get_by_id(created.id).await.unwrap().unwrap();
        fetched.name = "Mutated".to_owned();
        fetched.tags.push("leak".to_owned());
        fetched.greetings.clear();

        let again = store.characters.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(again, created);

        let patch = CharacterPatch { name: Some("Renamed".to_owned()), ..Default::default() };
        let updated = store.characters.update(created.id, patch).await.unwrap();
        assert_eq!(updated.name, "Renamed");
        // the value handed out before the update is untouched
        assert_eq!(again.name, "Captain");
        assert_eq!(fetched.name, "Mutated");
    }

    fn new_scene(owner_id: Uuid) -> NewScene {
        NewScene {
            owner_id,
            scene_type: SceneType::MainCharacter,
            genres: vec!["drama".to_owned()],
            time_periods: vec!["modern".to_owned()],
            locations: vec!["hospital".to_owned()],
            tones: vec!["tense".to_owned()],
            backstory: "The night shift is short-staffed.".to_owned(),
            player_goal: "Keep the ward calm".to_owned(),
            intro_text: "The monitors start beeping.".to_owned(),
            character_greeting: "You're late.".to_owned(),
            name: "Ward Nine".to_owned(),
            cover_image_url: Some("https://cdn.example.com/ward.png".to_owned()),
            chat_theme_color: "#224466".to_owned(),
            tags: vec!["medical".to_owned()],
            visibility: Visibility::Unlisted,
            status: SceneStatus::Draft,
            linked_character_id: Some(Uuid::now_v7()),
        }
    }

    #[tokio::test]
    async fn test_scene_round_trip() {
        let store = storage();
        let input = new_scene(Uuid::now_v7());
        let created = store.scenes.insert(input.clone()).await.unwrap();
        let fetched = store.scenes.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.owner_id, input.owner_id);
        assert_eq!(fetched.scene_type, input.scene_type);
        assert_eq!(fetched.genres, input.genres);
        assert_eq!(fetched.time_periods, input.time_periods);
        assert_eq!(fetched.locations, input.locations);
        assert_eq!(fetched.tones, input.tones);
        assert_eq!(fetched.backstory, input.backstory);
        assert_eq!(fetched.player_goal, input.player_goal);
        assert_eq!(fetched.intro_text, input.intro_text);
        assert_eq!(fetched.character_greeting, input.character_greeting);
        assert_eq!(fetched.name, input.name);
        assert_eq!(fetched.cover_image_url, input.cover_image_url);
        assert_eq!(fetched.chat_theme_color, input.chat_theme_color);
        assert_eq!(fetched.tags, input.tags);
        assert_eq!(fetched.visibility, input.visibility);
        assert_eq!(fetched.status, input.status);
        assert_eq!(fetched.linked_character_id, input.linked_character_id);
        assert_eq!(fetched.analytics.plays, 0);
    }

    #[tokio::test]
    async fn test_scene_copies_are_isolated() {
        let store = storage();
        let created = store.scenes.insert(new_scene(Uuid::now_v7())).await.unwrap();

        let mut fetched = store.scenes.get_by_id(created.id).await.unwrap().unwrap();
        fetched.name = "Mutated".to_owned();
        fetched.genres.push("leak".to_owned());
        fetched.status = SceneStatus::Published;

        let again = store.scenes.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(again, created);

        let patch = ScenePatch { tones: Some(vec!["calm".to_owned()]), ..Default::default() };
        store.scenes.update(created.id, patch).await.unwrap();
        assert_eq!(again.tones, vec!["tense".to_owned()]);
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let store = storage();
        let input = NewChat {
            character_id: Some(Uuid::now_v7()),
            settings: ChatSettings {
                preferred_voice: Some("reyes".to_owned()),
                ai_feedback_on: false,
                auto_save_on: true,
            },
            ..new_chat(Uuid::now_v7())
        };
        let created = store.chats.insert(input.clone()).await.unwrap();
        let fetched = store.chats.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.user_id, input.user_id);
        assert_eq!(fetched.scene_id, input.scene_id);
        assert_eq!(fetched.character_id, input.character_id);
        assert_eq!(fetched.title, input.title);
        assert_eq!(fetched.settings, input.settings);
        assert_eq!(fetched.status, ChatStatus::Active);
        assert_eq!(fetched.started_at, fetched.last_activity_at);
    }

    #[tokio::test]
    async fn test_chat_copies_are_isolated() {
        let store = storage();
        let created = store.chats.insert(new_chat(Uuid::now_v7())).await.unwrap();

        let mut fetched = store.chats.get_by_id(created.id).await.unwrap().unwrap();
        fetched.title = "Mutated".to_owned();
        fetched.settings.auto_save_on = false;

        let again = store.chats.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(again, created);

        let patch = ChatPatch { title: Some("Debrief".to_owned()), ..Default::default() };
        let updated = store.chats.update(created.id, patch).await.unwrap();
        assert_eq!(updated.title, "Debrief");
        assert_eq!(again.title, "Briefing");
    }

    #[tokio::test]
    async fn test_character_listing_and_delete() {
        let store = storage();
        let owner = Uuid::now_v7();
        let public = store.characters.insert(new_character(owner, Visibility::Public)).await.unwrap();
        let private = store.characters.insert(new_character(owner, Visibility::Private)).await.unwrap();
        store
            .characters
            .insert(new_character(Uuid::now_v7(), Visibility::Unlisted))
            .await
            .unwrap();

        let listed = store.characters.list_public().await.unwrap();
        assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![public.id]);

        let mine = store.characters.list_by_owner(owner).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().any(|c| c.id == private.id));

        store.characters.delete(private.id).await.unwrap();
        assert_eq!(store.characters.get_by_id(private.id).await.unwrap(), None);
        assert_eq!(store.characters.list_by_owner(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_character_patch_keeps_avatar_when_absent() {
        let store = storage();
        let created = store
            .characters
            .insert(new_character(Uuid::now_v7(), Visibility::Private))
            .await
            .unwrap();

        let patch = CharacterPatch { visibility: Some(Visibility::Public), ..Default::default() };
        let updated = store.characters.update(created.id, patch).await.unwrap();
        assert_eq!(updated.visibility, Visibility::Public);
        assert_eq!(updated.avatar_url, created.avatar_url);
        assert_eq!(updated.greetings, created.greetings);
    }

    #[tokio::test]
    async fn test_messages_are_ordered_and_limited() {
        let store = storage();
        let chat_id = Uuid::now_v7();
        for body in ["first", "second", "third"] {
            store.messages.insert(user_message(chat_id, body)).await.unwrap();
        }
        store.messages.insert(user_message(Uuid::now_v7(), "elsewhere")).await.unwrap();

        let all = store.messages.list_by_chat_id(chat_id, None).await.unwrap();
        let bodies: Vec<_> = all.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["first", "second", "third"]);
        assert!(all.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        let limited = store.messages.list_by_chat_id(chat_id, Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].body, "first");
    }

    #[tokio::test]
    async fn test_message_like_state_update() {
        let store = storage();
        let message = store.messages.insert(user_message(Uuid::now_v7(), "hi")).await.unwrap();
        assert_eq!(message.like_state, LikeState::None);

        let patch = MessagePatch { like_state: Some(LikeState::Like) };
        let updated = store.messages.update(message.id, patch).await.unwrap();
        assert_eq!(updated.like_state, LikeState::Like);
        assert_eq!(updated.body, message.body);
        assert_eq!(updated.created_at, message.created_at);
    }

    #[tokio::test]
    async fn test_recent_chats_sort_by_last_activity() {
        let store = storage();
        let user_id = Uuid::now_v7();
        let older = store.chats.insert(new_chat(user_id)).await.unwrap();
        let newer = store.chats.insert(new_chat(user_id)).await.unwrap();
        store.chats.insert(new_chat(Uuid::now_v7())).await.unwrap();

        let later = newer.last_activity_at + Duration::minutes(5);
        let patch = ChatPatch { last_activity_at: Some(later), ..Default::default() };
        store.chats.update(older.id, patch).await.unwrap();

        let recent = store.chats.list_recent_by_user(user_id).await.unwrap();
        assert_eq!(recent.iter().map(|c| c.id).collect::<Vec<_>>(), vec![older.id, newer.id]);
    }

    #[tokio::test]
    async fn test_last_activity_never_moves_backwards() {
        let store = storage();
        let chat = store.chats.insert(new_chat(Uuid::now_v7())).await.unwrap();

        let earlier = chat.last_activity_at - Duration::hours(1);
        let patch = ChatPatch { last_activity_at: Some(earlier), ..Default::default() };
        let updated = store.chats.update(chat.id, patch).await.unwrap();
        assert_eq!(updated.last_activity_at, chat.last_activity_at);

        let touched = store.chats.update(chat.id, ChatPatch::default()).await.unwrap();
        assert!(touched.last_activity_at >= chat.last_activity_at);
        assert_eq!(touched.started_at, chat.started_at);
    }

    #[tokio::test]
    async fn test_metrics_upsert_replaces() {
        let store = storage();
        let user_id = Uuid::now_v7();
        assert_eq!(store.profile_metrics.get_by_user_id(user_id).await.unwrap(), None);

        store.profile_metrics.upsert(ProfileMetrics::empty(user_id)).await.unwrap();
        let mut metrics = store.profile_metrics.get_by_user_id(user_id).await.unwrap().unwrap();
        metrics.total_chats = 3;
        store.profile_metrics.upsert(metrics.clone()).await.unwrap();

        assert_eq!(store.profile_metrics.get_by_user_id(user_id).await.unwrap(), Some(metrics));
    }

    #[tokio::test]
    async fn test_upload_resolution() {
        let store = storage();
        let upload = store
            .uploads
            .create_upload(NewUpload {
                url: "https://files.example.com/cover.png".to_owned(),
                expires_at: now(),
            })
            .await
            .unwrap();

        assert_eq!(
            store.resolve_upload(Some(upload.upload_id)).await.unwrap().as_deref(),
            Some("https://files.example.com/cover.png")
        );
        assert_eq!(store.resolve_upload(Some(Uuid::now_v7())).await.unwrap(), None);
        assert_eq!(store.resolve_upload(None).await.unwrap(), None);
    }
}
