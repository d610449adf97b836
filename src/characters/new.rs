use axum::{debug_handler, extract::State};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    models::{Greeting, NewCharacter, Visibility},
    res::Envelope,
    session::CurrentUser,
    store::Storage,
    validate::{FieldErrors, Validate, Validated},
    AppResult, AppState,
};

use super::CharacterBody;

pub(crate) fn check_greetings(greetings: &[Greeting], errors: &mut FieldErrors) {
    if greetings.iter().any(|g| g.text.is_empty()) {
        errors.add("greetings", "Greeting text must contain at least 1 character(s)");
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewCharacterBody {
    name: String,
    #[serde(default)]
    tagline: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    greetings: Vec<Greeting>,
    #[serde(default)]
    tags: Vec<String>,
    visibility: Visibility,
    #[serde(default)]
    ai_greeting_enabled: bool,
    avatar_upload_id: Option<Uuid>,
}

impl Validate for NewCharacterBody {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.min_len("name", &self.name, 1);
        check_greetings(&self.greetings, errors);
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(storage): State<Storage>,
    CurrentUser(user): CurrentUser,
    Validated { body, .. }: Validated<NewCharacterBody>,
) -> AppResult<Envelope<CharacterBody>> {
    // an unknown upload id leaves the avatar empty
    let avatar_url = storage.resolve_upload(body.avatar_upload_id).await?;

    let character = storage
        .characters
        .insert(NewCharacter {
            owner_id: user.id,
            name: body.name,
            tagline: body.tagline,
            description: body.description,
            greetings: body.greetings,
            tags: body.tags,
            visibility: body.visibility,
            ai_greeting_enabled: body.ai_greeting_enabled,
            avatar_url,
        })
        .await?;

    Ok(Envelope::created(CharacterBody { character }))
}
