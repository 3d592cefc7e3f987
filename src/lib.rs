//! # Scroll Keeper
//!
//! Scroll position storage for client-side navigation. Each navigation
//! location gets its scroll offset saved on departure and restored when the
//! user comes back to it.
//!
//! ## Core Concepts
//!
//! - **Identity**: a location's `key`, else its `hash`, else `"loadPage"`
//! - **State keys**: `@@scroll|<identity>` or `@@scroll|<identity>|<subKey>`
//! - **Sub-keys**: scroll of individual elements, filed under the page
//!   departed most recently rather than the page currently reported
//! - **Soft failure**: storage errors are logged and never interrupt
//!   navigation
//!
//! ## Example
//!
//! ```ignore
//! use scroll_keeper::{create, Environment, MemoryHistory, ScrollBehaviorOptions};
//! use std::sync::Arc;
//!
//! let history = Arc::new(MemoryHistory::default());
//! let behavior = create(ScrollBehaviorOptions::default(), history.clone(), Environment::Interactive)
//!     .expect("interactive environment");
//!
//! let here = history.push("/articles");
//! behavior.state_storage().save(&here, None, &serde_json::json!([0, 480]));
//! behavior.track_departure();
//! history.push("/articles/42");
//! ```

pub mod backend;
pub mod behavior;
pub mod error;
pub mod navigation;
pub mod storage;
pub mod types;

// Re-exports
pub use backend::{BackingStore, FileBackend, FileBackendConfig, MemoryBackend};
pub use behavior::{
    create, Environment, ScrollBehavior, ScrollBehaviorConfig, ScrollBehaviorOptions,
    ScrollDecision, ShouldUpdateScroll,
};
pub use error::{Result, StorageError};
pub use navigation::{History, Listener, ListenerId, MemoryHistory};
pub use storage::{PreviousIdentity, SaveOutcome, SessionStorage, StateStorage};
pub use types::*;
