use serde::Deserialize;
use uuid::Uuid;

use crate::{store::Storage, validate::Validate, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    ForYou,
    Featured,
    Popular,
}

/// Query for the public character and scene listings.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub section: Option<Section>,
    pub tag: Option<String>,
    pub creator: Option<String>,
}

impl Validate for ListQuery {}

#[derive(Debug)]
pub struct Filter {
    tag: Option<String>,
    /// `Some(None)`: a creator was named but matches nobody.
    owner: Option<Option<Uuid>>,
}

impl ListQuery {
    /// `creator` is an owner id or an owner username.
    pub async fn into_filter(self, storage: &Storage) -> AppResult<Filter> {
        let owner = match self.creator {
            None => None,
            Some(creator) => Some(match creator.parse::<Uuid>() {
                Ok(id) => Some(id),
                Err(_) => storage.users.get_by_username(&creator).await?.map(|u| u.id),
            }),
        };
        if let Some(section) = self.section {
            tracing::debug!(?section, "listing section requested");
        }
        Ok(Filter { tag: self.tag, owner })
    }
}

impl Filter {
    pub fn matches(&self, owner_id: Uuid, tags: &[String]) -> bool {
        let tag_ok = self.tag.as_ref().is_none_or(|tag| tags.contains(tag));
        let owner_ok = match self.owner {
            None => true,
            Some(owner) => owner == Some(owner_id),
        };
        tag_ok && owner_ok
    }
}
