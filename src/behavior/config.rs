//! Options accepted by the adapter and the configuration it hands to the
//! scroll orchestrator.

use crate::navigation::{Listener, ListenerId};
use crate::storage::StateStorage;
use crate::types::{CurrentLocation, ScrollPosition};
use std::fmt;
use std::sync::Arc;

/// What the orchestrator should do with scroll after a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum ScrollDecision {
    /// Restore the saved position, or go to the top if there is none.
    Restore,
    /// Leave scroll alone.
    Skip,
    /// Scroll to an explicit offset.
    ScrollTo(ScrollPosition),
    /// Scroll the element with this id into view.
    ScrollToElement(String),
}

impl From<bool> for ScrollDecision {
    fn from(update: bool) -> Self {
        if update {
            ScrollDecision::Restore
        } else {
            ScrollDecision::Skip
        }
    }
}

/// Policy deciding scroll handling per transition.
///
/// Called with the previous location (None on first render) and the
/// current one.
pub type ShouldUpdateScroll =
    Arc<dyn Fn(Option<&CurrentLocation>, &CurrentLocation) -> ScrollDecision + Send + Sync>;

/// Registers a transition listener with the history.
pub type AddTransitionHook = Arc<dyn Fn(Listener) -> ListenerId + Send + Sync>;

/// Removes a listener registered through [`AddTransitionHook`].
pub type RemoveTransitionHook = Arc<dyn Fn(ListenerId) -> bool + Send + Sync>;

/// Reports the current location and the transition that led to it.
pub type GetCurrentLocation = Arc<dyn Fn() -> CurrentLocation + Send + Sync>;

/// Options for [`create`](super::create).
#[derive(Clone, Default)]
pub struct ScrollBehaviorOptions {
    /// Per-transition policy (None = always restore).
    pub should_update_scroll: Option<ShouldUpdateScroll>,

    /// Forwarded verbatim; true disables automatic scroll application.
    pub manual: bool,

    /// Storage to use (None = fresh in-memory session storage).
    pub state_storage: Option<Arc<dyn StateStorage>>,
}

impl ScrollBehaviorOptions {
    pub fn with_policy<F>(mut self, policy: F) -> Self
    where
        F: Fn(Option<&CurrentLocation>, &CurrentLocation) -> ScrollDecision + Send + Sync + 'static,
    {
        self.should_update_scroll = Some(Arc::new(policy));
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn StateStorage>) -> Self {
        self.state_storage = Some(storage);
        self
    }

    pub fn manual(mut self, manual: bool) -> Self {
        self.manual = manual;
        self
    }
}

impl fmt::Debug for ScrollBehaviorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollBehaviorOptions")
            .field("should_update_scroll", &self.should_update_scroll.is_some())
            .field("manual", &self.manual)
            .field("state_storage", &self.state_storage.is_some())
            .finish()
    }
}

/// The configuration object consumed by the scroll orchestrator.
#[derive(Clone)]
pub struct ScrollBehaviorConfig {
    pub add_transition_hook: AddTransitionHook,
    pub remove_transition_hook: RemoveTransitionHook,
    pub state_storage: Arc<dyn StateStorage>,
    pub get_current_location: GetCurrentLocation,
    pub should_update_scroll: Option<ShouldUpdateScroll>,
    pub manual: bool,
}

impl fmt::Debug for ScrollBehaviorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollBehaviorConfig")
            .field("should_update_scroll", &self.should_update_scroll.is_some())
            .field("manual", &self.manual)
            .finish_non_exhaustive()
    }
}
