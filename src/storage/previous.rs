//! Tracking of the last departed page identity.

use crate::types::Identity;
use parking_lot::RwLock;
use std::sync::Arc;

/// Identity of the last whole-page location departed from.
///
/// Each [`SessionStorage`](super::SessionStorage) owns one. Cloning the
/// handle shares the underlying slot, so storages that must agree on the
/// previous page can be built with [`SessionStorage::with_previous`](super::SessionStorage::with_previous).
#[derive(Clone, Debug, Default)]
pub struct PreviousIdentity {
    slot: Arc<RwLock<Option<Identity>>>,
}

impl PreviousIdentity {
    /// Unset handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value (None until the first departure or sub-key save).
    pub fn get(&self) -> Option<Identity> {
        self.slot.read().clone()
    }

    /// Overwrite unconditionally.
    pub fn set(&self, identity: Identity) {
        *self.slot.write() = Some(identity);
    }

    /// Store `identity` if it differs from the current value.
    ///
    /// Returns true when the value changed.
    pub fn update_if_changed(&self, identity: &Identity) -> bool {
        let mut slot = self.slot.write();
        if slot.as_ref() == Some(identity) {
            return false;
        }
        *slot = Some(identity.clone());
        true
    }

    /// True when both handles point at the same slot.
    pub fn shares_with(&self, other: &PreviousIdentity) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}
