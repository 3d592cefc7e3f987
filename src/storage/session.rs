//! Session storage keyed by location identity.

use super::PreviousIdentity;
use crate::backend::{BackingStore, MemoryBackend};
use crate::error::{Result, StorageError};
use crate::types::{Identity, Location, StateKey, STATE_KEY_PREFIX};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Result of a save. Failures are already logged; inspecting the outcome
/// is optional.
#[derive(Debug)]
pub enum SaveOutcome {
    /// The value was written under this key.
    Saved(StateKey),
    /// The write was abandoned.
    Skipped {
        state_key: StateKey,
        error: StorageError,
    },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }

    /// Key the save targeted, whether or not it was written.
    pub fn state_key(&self) -> &StateKey {
        match self {
            SaveOutcome::Saved(key) => key,
            SaveOutcome::Skipped { state_key, .. } => state_key,
        }
    }
}

/// Storage contract consumed by the scroll orchestrator.
///
/// Values cross this boundary as JSON. A stored JSON `null` reads back as
/// no value.
pub trait StateStorage: Send + Sync {
    /// Record the identity of the page being left.
    fn notify_departure(&self, identity: Identity);

    /// Value stored for `location` (and `sub_key`), if any.
    fn read(&self, location: &Location, sub_key: Option<&str>) -> Option<serde_json::Value>;

    /// Persist `value` for `location` (and `sub_key`).
    fn save(
        &self,
        location: &Location,
        sub_key: Option<&str>,
        value: &serde_json::Value,
    ) -> SaveOutcome;
}

/// Key-scoped storage over a [`BackingStore`].
///
/// Whole-page values are filed under the caller's location. Sub-keyed
/// values are filed under the previously departed page instead, since by
/// the time an element's scroll is saved the history may already report the
/// next page as current.
pub struct SessionStorage<B: BackingStore = MemoryBackend> {
    backend: B,
    previous: PreviousIdentity,
}

impl SessionStorage<MemoryBackend> {
    /// Storage over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl Default for SessionStorage<MemoryBackend> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<B: BackingStore> SessionStorage<B> {
    /// Storage with its own, unset previous identity.
    pub fn new(backend: B) -> Self {
        Self::with_previous(backend, PreviousIdentity::new())
    }

    /// Storage that tracks the previous identity in a shared slot.
    pub fn with_previous(backend: B, previous: PreviousIdentity) -> Self {
        Self { backend, previous }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Handle to this storage's previous-identity slot.
    pub fn previous(&self) -> &PreviousIdentity {
        &self.previous
    }

    /// Identity of the last departed page.
    pub fn previous_identity(&self) -> Option<Identity> {
        self.previous.get()
    }

    /// Set the previous identity unconditionally.
    pub fn notify_departure(&self, identity: impl Into<Identity>) {
        let identity = identity.into();
        tracing::debug!(identity = %identity, "departure recorded");
        self.previous.set(identity);
    }

    /// Key a read for `location` would use. Never re-parented.
    pub fn state_key(&self, location: &Location, sub_key: Option<&str>) -> StateKey {
        StateKey::for_location(location, sub_key)
    }

    /// Key a save for `location` would use right now.
    pub fn save_key(&self, location: &Location, sub_key: Option<&str>) -> StateKey {
        StateKey::new(&self.save_identity(location, sub_key), sub_key)
    }

    /// Read and deserialize the value for `location`.
    ///
    /// Missing, unreadable or malformed entries all yield `None`.
    pub fn read_as<T: DeserializeOwned>(
        &self,
        location: &Location,
        sub_key: Option<&str>,
    ) -> Option<T> {
        let state_key = self.state_key(location, sub_key);
        match self.load(&state_key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(state_key = %state_key, error = %e, "failed to read scroll state");
                None
            }
        }
    }

    /// Serialize and persist `value` for `location`.
    ///
    /// With a non-empty `sub_key` the value is filed under the previous
    /// identity (falling back to `location.hash`, then `"loadPage"`), and
    /// the previous identity is then advanced to that resolved identity.
    pub fn save_as<T: Serialize + ?Sized>(
        &self,
        location: &Location,
        sub_key: Option<&str>,
        value: &T,
    ) -> SaveOutcome {
        let reparent = is_reparenting(sub_key);
        let identity = self.save_identity(location, sub_key);
        let state_key = StateKey::new(&identity, sub_key);

        let outcome = match self.store(&state_key, value) {
            Ok(()) => {
                tracing::debug!(state_key = %state_key, "scroll state saved");
                SaveOutcome::Saved(state_key)
            }
            Err(error) => {
                tracing::warn!(state_key = %state_key, error = %error, "failed to save scroll state");
                SaveOutcome::Skipped { state_key, error }
            }
        };

        if reparent && self.previous.update_if_changed(&identity) {
            tracing::debug!(identity = %identity, "previous identity advanced by sub-key save");
        }

        outcome
    }

    /// Every state key currently persisted in the scroll namespace.
    pub fn state_keys(&self) -> Vec<StateKey> {
        match self.backend.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| k.starts_with(STATE_KEY_PREFIX))
                .map(StateKey::from_raw)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to list scroll state");
                Vec::new()
            }
        }
    }

    /// Remove every scroll entry, leaving foreign keys alone.
    ///
    /// Returns how many entries were removed.
    pub fn clear(&self) -> usize {
        let mut removed = 0;
        for key in self.state_keys() {
            match self.backend.remove_item(key.as_str()) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(state_key = %key, error = %e, "failed to remove scroll state")
                }
            }
        }
        removed
    }

    fn save_identity(&self, location: &Location, sub_key: Option<&str>) -> Identity {
        if is_reparenting(sub_key) {
            let previous = self.previous.get();
            Identity::resolve(
                previous.as_ref().map(Identity::as_str),
                location.hash.as_deref(),
            )
        } else {
            location.identity()
        }
    }

    fn load<T: DeserializeOwned>(&self, state_key: &StateKey) -> Result<Option<T>> {
        let Some(raw) = self.backend.get_item(state_key.as_str())? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Deserialization(e.to_string()))
    }

    fn store<T: Serialize + ?Sized>(&self, state_key: &StateKey, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        self.backend.set_item(state_key.as_str(), &encoded)
    }
}

impl<B: BackingStore> StateStorage for SessionStorage<B> {
    fn notify_departure(&self, identity: Identity) {
        Self::notify_departure(self, identity);
    }

    fn read(&self, location: &Location, sub_key: Option<&str>) -> Option<serde_json::Value> {
        self.read_as::<serde_json::Value>(location, sub_key)
            .filter(|v| !v.is_null())
    }

    fn save(
        &self,
        location: &Location,
        sub_key: Option<&str>,
        value: &serde_json::Value,
    ) -> SaveOutcome {
        self.save_as(location, sub_key, value)
    }
}

/// Only a non-empty sub-key triggers re-parenting.
fn is_reparenting(sub_key: Option<&str>) -> bool {
    matches!(sub_key, Some(s) if !s.is_empty())
}
