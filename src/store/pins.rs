use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};

use uuid::Uuid;

use super::{StoreError, StoreResult};

type Pins = HashMap<Uuid, BTreeSet<Uuid>>;

/// Pinned chat ids per user. Lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct PinStore {
    pins: Arc<Mutex<Pins>>,
}

impl PinStore {
    fn lock(&self) -> StoreResult<MutexGuard<'_, Pins>> {
        self.pins.lock().map_err(|_| StoreError::Poisoned("pins"))
    }

    pub fn pin(&self, user_id: Uuid, chat_id: Uuid) -> StoreResult<()> {
        self.lock()?.entry(user_id).or_default().insert(chat_id);
        Ok(())
    }

    pub fn unpin(&self, user_id: Uuid, chat_id: Uuid) -> StoreResult<()> {
        let mut pins = self.lock()?;
        if let Some(set) = pins.get_mut(&user_id) {
            set.remove(&chat_id);
            if set.is_empty() {
                pins.remove(&user_id);
            }
        }
        Ok(())
    }

    /// Chat ids in ascending (creation) order.
    pub fn pinned(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(self
            .lock()?
            .get(&user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_then_unpin_restores() {
        let pins = PinStore::default();
        let user = Uuid::now_v7();
        let kept = Uuid::now_v7();
        let chat = Uuid::now_v7();

        pins.pin(user, kept).unwrap();
        let before = pins.pinned(user).unwrap();

        pins.pin(user, chat).unwrap();
        assert!(pins.pinned(user).unwrap().contains(&chat));

        pins.unpin(user, chat).unwrap();
        assert_eq!(pins.pinned(user).unwrap(), before);
        assert!(!pins.pinned(user).unwrap().contains(&chat));
    }

    #[test]
    fn test_pins_are_per_user_and_idempotent() {
        let pins = PinStore::default();
        let (alice, bob) = (Uuid::now_v7(), Uuid::now_v7());
        let (first, second) = (Uuid::now_v7(), Uuid::now_v7());

        pins.pin(alice, second).unwrap();
        pins.pin(alice, first).unwrap();
        pins.pin(alice, first).unwrap();
        pins.unpin(bob, first).unwrap();

        assert_eq!(pins.pinned(alice).unwrap(), vec![first, second]);
        assert!(pins.pinned(bob).unwrap().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let pins = PinStore::default();
        let handle = pins.clone();
        let (user, chat) = (Uuid::now_v7(), Uuid::now_v7());

        handle.pin(user, chat).unwrap();
        assert_eq!(pins.pinned(user).unwrap(), vec![chat]);
    }
}
