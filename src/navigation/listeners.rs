//! Transition listener registry.

use crate::types::{Action, Location};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback invoked with the new location and the transition kind.
pub type Listener = Arc<dyn Fn(&Location, Action) + Send + Sync>;

/// Handle returned by [`ListenerRegistry::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Listeners in registration order.
pub struct ListenerRegistry {
    listeners: RwLock<BTreeMap<ListenerId, Listener>>,
    /// Counter for generating listener IDs.
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn add(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.write().insert(id, listener);
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        self.listeners.write().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Call every listener.
    ///
    /// Listeners run without the registry lock held, so they may add or
    /// remove listeners; such changes apply from the next notification.
    pub fn notify(&self, location: &Location, action: Action) {
        let snapshot: Vec<Listener> = self.listeners.read().values().cloned().collect();
        for listener in snapshot {
            listener(location, action);
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
