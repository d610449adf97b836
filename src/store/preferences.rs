use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use uuid::Uuid;

use crate::models::{Preferences, PreferencesPatch};

use super::{StoreError, StoreResult};

/// Per-user notification and coaching flags. Users without an entry get
/// [`Preferences::default`].
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    prefs: Arc<RwLock<HashMap<Uuid, Preferences>>>,
}

impl PreferenceStore {
    pub fn get(&self, user_id: Uuid) -> StoreResult<Preferences> {
        let prefs = self.prefs.read().map_err(|_| StoreError::Poisoned("preferences"))?;
        Ok(prefs.get(&user_id).copied().unwrap_or_default())
    }

    pub fn update(&self, user_id: Uuid, patch: PreferencesPatch) -> StoreResult<Preferences> {
        let mut prefs = self.prefs.write().map_err(|_| StoreError::Poisoned("preferences"))?;
        let entry = prefs.entry(user_id).or_default();
        if let Some(on) = patch.email_notifications {
            entry.email_notifications = on;
        }
        if let Some(on) = patch.ai_feedback_on {
            entry.ai_feedback_on = on;
        }
        if let Some(on) = patch.auto_save_on {
            entry.auto_save_on = on;
        }
        Ok(*entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = PreferenceStore::default();
        let prefs = store.get(Uuid::now_v7()).unwrap();
        assert!(!prefs.email_notifications);
        assert!(prefs.ai_feedback_on);
        assert!(prefs.auto_save_on);
    }

    #[test]
    fn test_partial_update() {
        let store = PreferenceStore::default();
        let user = Uuid::now_v7();

        let patch = PreferencesPatch { email_notifications: Some(true), ..Default::default() };
        let updated = store.update(user, patch).unwrap();
        assert!(updated.email_notifications);
        assert!(updated.ai_feedback_on);

        let patch = PreferencesPatch { auto_save_on: Some(false), ..Default::default() };
        store.update(user, patch).unwrap();
        let prefs = store.get(user).unwrap();
        assert!(prefs.email_notifications);
        assert!(!prefs.auto_save_on);

        assert_eq!(store.get(Uuid::now_v7()).unwrap(), Preferences::default());
    }
}
