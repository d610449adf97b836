use axum::{debug_handler, extract::State};
use serde::Serialize;

use crate::{
    models::Sender,
    res::Envelope,
    store::Storage,
    validate::{Skip, Validated},
    AppResult, AppState,
};

use super::{find_chat, ChatParams};

const DEMO_AUDIO_URL: &str = "https://files.rolesim.app/audio/demo-response.mp3";

#[derive(Debug, Serialize)]
pub(crate) struct SkillScore {
    skill: &'static str,
    score: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Insights {
    tone: &'static str,
    coaching_tip: &'static str,
    skill_scores: Vec<SkillScore>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Analysis {
    insights: Insights,
}

/// Canned coaching. The tip only depends on whether the user has spoken yet.
#[debug_handler(state = AppState)]
pub(crate) async fn analysis(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, ChatParams>,
) -> AppResult<Envelope<Analysis>> {
    let chat = find_chat(&storage, params.chat_id).await?;
    let messages = storage.messages.list_by_chat_id(chat.id, None).await?;
    let user_spoke = messages
        .iter()
        .any(|m| m.sender == Sender::User && !m.body.is_empty());

    let coaching_tip = if user_spoke {
        "Acknowledge the team's emotional state before shifting to tactical requests."
    } else {
        "Consider setting expectations for the simulation run."
    };

    Ok(Envelope::ok(Analysis {
        insights: Insights {
            tone: "confident",
            coaching_tip,
            skill_scores: vec![
                SkillScore { skill: "Empathy", score: 7 },
                SkillScore { skill: "Leadership", score: 8 },
                SkillScore { skill: "Clarity", score: 6 },
            ],
        },
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Voice {
    audio_url: &'static str,
}

#[debug_handler(state = AppState)]
pub(crate) async fn voice(
    State(storage): State<Storage>,
    Validated { params, .. }: Validated<Skip, Skip, ChatParams>,
) -> AppResult<Envelope<Voice>> {
    find_chat(&storage, params.chat_id).await?;
    Ok(Envelope::accepted(Voice { audio_url: DEMO_AUDIO_URL }))
}
