//! Glue between a history, a scroll state storage and the scroll
//! orchestrator.
//!
//! # Example
//!
//! ```ignore
//! let history = Arc::new(MemoryHistory::default());
//! let behavior = create(ScrollBehaviorOptions::default(), history, Environment::Interactive)
//!     .expect("interactive environment");
//!
//! // Orchestrator: before each transition
//! behavior.track_departure();
//! ```

mod config;
mod environment;

pub use config::{
    AddTransitionHook, GetCurrentLocation, RemoveTransitionHook, ScrollBehaviorConfig,
    ScrollBehaviorOptions, ScrollDecision, ShouldUpdateScroll,
};
pub use environment::Environment;

use crate::navigation::History;
use crate::storage::{SessionStorage, StateStorage};
use crate::types::{CurrentLocation, Identity};
use std::sync::Arc;

/// Bound scroll behavior: the orchestrator configuration plus the
/// departure hook.
pub struct ScrollBehavior {
    config: ScrollBehaviorConfig,
    history: Arc<dyn History>,
}

/// Build the scroll behavior for `history`.
///
/// Returns `None` in a headless environment; no storage is created then.
pub fn create(
    options: ScrollBehaviorOptions,
    history: Arc<dyn History>,
    environment: Environment,
) -> Option<ScrollBehavior> {
    if !environment.is_interactive() {
        tracing::debug!("no browsing context, scroll restoration inactive");
        return None;
    }

    let state_storage = options
        .state_storage
        .unwrap_or_else(|| Arc::new(SessionStorage::in_memory()));

    let add_transition_hook: AddTransitionHook = {
        let history = Arc::clone(&history);
        Arc::new(move |listener| history.listen(listener))
    };
    let remove_transition_hook: RemoveTransitionHook = {
        let history = Arc::clone(&history);
        Arc::new(move |id| history.unlisten(id))
    };
    let get_current_location: GetCurrentLocation = {
        let history = Arc::clone(&history);
        Arc::new(move || CurrentLocation {
            location: history.location(),
            action: history.action(),
        })
    };

    Some(ScrollBehavior {
        config: ScrollBehaviorConfig {
            add_transition_hook,
            remove_transition_hook,
            state_storage,
            get_current_location,
            should_update_scroll: options.should_update_scroll,
            manual: options.manual,
        },
        history,
    })
}

impl ScrollBehavior {
    /// Record the current location as the page being departed.
    ///
    /// Returns the identity recorded. The orchestrator calls this at each
    /// navigation so later sub-key saves file under the right page.
    pub fn track_departure(&self) -> Identity {
        let identity = self.history.location().identity();
        self.config.state_storage.notify_departure(identity.clone());
        identity
    }

    /// Configuration for the orchestrator.
    pub fn config(&self) -> &ScrollBehaviorConfig {
        &self.config
    }

    pub fn state_storage(&self) -> &Arc<dyn StateStorage> {
        &self.config.state_storage
    }

    pub fn manual(&self) -> bool {
        self.config.manual
    }

    pub fn current_location(&self) -> CurrentLocation {
        (self.config.get_current_location)()
    }

    /// Apply the configured policy, defaulting to [`ScrollDecision::Restore`].
    pub fn should_update_scroll(
        &self,
        previous: Option<&CurrentLocation>,
        current: &CurrentLocation,
    ) -> ScrollDecision {
        match &self.config.should_update_scroll {
            Some(policy) => policy(previous, current),
            None => ScrollDecision::Restore,
        }
    }
}
