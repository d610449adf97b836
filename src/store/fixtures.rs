use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    models::{
        Character, CharacterStats, ChatSession, ChatSettings, ChatStatus, Greeting, LikeState,
        Message, MessageMetadata, ProfileMetrics, Scene, SceneAnalytics, SceneStatus, SceneType,
        Sender, UploadReference, User, Visibility,
    },
    security::hash_password,
};

use super::Seed;

pub const DEMO_EMAIL: &str = "demo@rolesim.app";
pub const DEMO_USERNAME: &str = "stagehand";
pub const DEMO_PASSWORD: &str = "rolesim-demo";

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}

/// The demo data set the server boots with.
pub fn demo_seed() -> anyhow::Result<Seed> {
    let now = OffsetDateTime::now_utc();
    let user_id = Uuid::now_v7();
    let character_id = Uuid::now_v7();
    let scene_id = Uuid::now_v7();
    let chat_id = Uuid::now_v7();

    let user = User {
        id: user_id,
        email: DEMO_EMAIL.to_owned(),
        username: DEMO_USERNAME.to_owned(),
        password_hash: hash_password(DEMO_PASSWORD)?,
        avatar_url: None,
        bio: Some("Narrative designer rehearsing hard conversations.".to_owned()),
        created_at: now,
        updated_at: now,
    };

    let metrics = ProfileMetrics {
        user_id,
        total_chats: 42,
        scenes_created: 6,
        hours_practiced: 128,
        streak_days: 9,
        badges: tags(&["agency-builder", "tone-master", "crisis-coach"]),
    };

    let character = Character {
        id: character_id,
        owner_id: user_id,
        name: "Harbor Patrol Seven".to_owned(),
        tagline: "Called in when the storm hits".to_owned(),
        description: "A coast guard crew that drills calm communication under pressure.".to_owned(),
        greetings: vec![
            Greeting {
                text: "Reyes: \"Grab your jacket, we're needed at the pier.\"".to_owned(),
                order: 0,
            },
            Greeting {
                text: "Okafor: \"Radio check. Briefing in five.\"".to_owned(),
                order: 1,
            },
        ],
        tags: tags(&["rescue", "crisis", "teamwork"]),
        visibility: Visibility::Public,
        ai_greeting_enabled: true,
        avatar_url: None,
        stats: CharacterStats {
            sessions_completed: 2375,
            favorites: 860,
            rating: Some(4.8),
        },
        created_at: now,
        updated_at: now,
    };

    let scene = Scene {
        id: scene_id,
        owner_id: user_id,
        scene_type: SceneType::MainCharacter,
        genres: tags(&["crisis-response", "rescue"]),
        time_periods: tags(&["modern-day"]),
        locations: tags(&["harbor-station"]),
        tones: tags(&["urgent", "supportive"]),
        backstory: "A ferry lost power outside the breakwater and the crew needs a coordinator."
            .to_owned(),
        player_goal: "Keep the passengers calm and brief the harbor master.".to_owned(),
        intro_text: "The radio crackles. Harbor Patrol Seven needs you on channel 16.".to_owned(),
        character_greeting: "Reyes nods. \"Glad you made it. Here's what we know.\"".to_owned(),
        name: "Storm Desk: Harbor Patrol Seven".to_owned(),
        cover_image_url: None,
        chat_theme_color: "#111827".to_owned(),
        tags: tags(&["conflict-resolution", "leadership", "communication"]),
        visibility: Visibility::Public,
        status: SceneStatus::Published,
        linked_character_id: Some(character_id),
        analytics: SceneAnalytics {
            plays: 12450,
            likes: 8750,
            bookmarks: 4320,
            rating: Some(4.9),
        },
        created_at: now,
        updated_at: now,
    };

    let chat = ChatSession {
        id: chat_id,
        user_id,
        scene_id,
        character_id: Some(character_id),
        title: scene.name.clone(),
        status: ChatStatus::Active,
        started_at: now,
        last_activity_at: now,
        settings: ChatSettings {
            preferred_voice: Some("reyes".to_owned()),
            ..Default::default()
        },
    };

    let message = Message {
        id: Uuid::now_v7(),
        chat_id,
        sender: Sender::Ai,
        body: "The clock over the dispatch desk ticks past midnight when the radio lights up.\n\n\
               Reyes: \"Ferry's drifting, forty passengers aboard. We need someone on comms who \
               won't panic.\" Every face in the room turns toward you."
            .to_owned(),
        metadata: Some(MessageMetadata {
            sentiment: Some("neutral".to_owned()),
            tone: Some("urgent".to_owned()),
            actions: tags(&["notify-supervisor", "prep-debrief"]),
        }),
        created_at: now,
        like_state: LikeState::None,
    };

    let upload = UploadReference {
        upload_id: Uuid::now_v7(),
        url: "https://files.rolesim.app/uploads/demo-cover.png".to_owned(),
        expires_at: now + Duration::minutes(10),
    };

    Ok(Seed {
        users: vec![user],
        profile_metrics: vec![metrics],
        characters: vec![character],
        featured: vec![scene.clone()],
        popular: vec![scene.clone()],
        scenes: vec![scene],
        chats: vec![chat],
        messages: vec![message],
        uploads: vec![upload],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{security::verify_password, store::Storage};

    #[test]
    fn test_demo_seed_is_consistent() {
        let seed = demo_seed().unwrap();
        let user = &seed.users[0];
        let scene = &seed.scenes[0];

        assert!(verify_password(DEMO_PASSWORD, &user.password_hash));
        assert_eq!(seed.profile_metrics[0].user_id, user.id);
        assert_eq!(scene.linked_character_id, Some(seed.characters[0].id));
        assert_eq!(seed.chats[0].scene_id, scene.id);
        assert_eq!(seed.messages[0].chat_id, seed.chats[0].id);
        assert_eq!(seed.featured, vec![scene.clone()]);
    }

    #[tokio::test]
    async fn test_demo_seed_loads() {
        let seed = demo_seed().unwrap();
        let user_id = seed.users[0].id;
        let store = Storage::in_memory(seed);

        let user = store.users.get_by_username(DEMO_USERNAME).await.unwrap().unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(store.characters.list_public().await.unwrap().len(), 1);
        assert_eq!(store.chats.list_recent_by_user(user_id).await.unwrap().len(), 1);
        assert_eq!(store.collections.list_popular().await.unwrap().len(), 1);
    }
}
