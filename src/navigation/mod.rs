//! Navigation history abstraction.
//!
//! The scroll machinery never drives navigation itself. It reads the current
//! location and action from a [`History`] and subscribes to transitions.
//! [`MemoryHistory`] is a self-contained implementation for embedders
//! without a browser history, and for tests.

mod listeners;
mod memory;

pub use listeners::{Listener, ListenerId, ListenerRegistry};
pub use memory::MemoryHistory;

use crate::types::{Action, Location};

/// Source of the current location and of transition events.
pub trait History: Send + Sync {
    /// Location currently shown.
    fn location(&self) -> Location;

    /// Transition that produced the current location.
    fn action(&self) -> Action;

    /// Call `listener` after every transition.
    fn listen(&self, listener: Listener) -> ListenerId;

    /// Stop calling a listener. Returns false if it was not registered.
    fn unlisten(&self, id: ListenerId) -> bool;
}
