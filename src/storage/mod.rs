//! Key-scoped scroll state storage.
//!
//! Scroll values are filed under a [`StateKey`](crate::types::StateKey)
//! derived from a location's identity and an optional sub-key. Sub-keyed
//! saves (scrollable elements inside a page) are re-parented under the
//! identity of the page most recently departed, tracked by
//! [`PreviousIdentity`].
//!
//! Storage failures never propagate: reads degrade to `None`, saves to
//! [`SaveOutcome::Skipped`], and both log a warning.

mod previous;
mod session;

pub use previous::PreviousIdentity;
pub use session::{SaveOutcome, SessionStorage, StateStorage};
