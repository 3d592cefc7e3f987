//! Core types for location-keyed scroll state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace prefix of every persisted state key.
pub const STATE_KEY_PREFIX: &str = "@@scroll|";

/// Identity used when a location carries neither a key nor a hash.
pub const FALLBACK_IDENTITY: &str = "loadPage";

/// A navigation point as reported by the history collaborator.
///
/// Only `key` and `hash` take part in identity; the remaining fields are
/// carried so orchestrators see the full location.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default)]
    pub pathname: String,
    #[serde(default)]
    pub search: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
}

impl Location {
    /// Location at `pathname` with no key or hash.
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            ..Default::default()
        }
    }

    /// Set the history key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the hash fragment.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Resolve this location's identity.
    pub fn identity(&self) -> Identity {
        Identity::resolve(self.key.as_deref(), self.hash.as_deref())
    }
}

/// The string distinguishing one navigation location from another.
///
/// Resolution order is `key`, then `hash`, then [`FALLBACK_IDENTITY`].
/// Empty strings count as absent.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap an already-resolved identity string.
    pub fn new(identity: impl Into<String>) -> Self {
        Identity(identity.into())
    }

    /// Apply the `key || hash || "loadPage"` fallback chain.
    pub fn resolve(key: Option<&str>, hash: Option<&str>) -> Self {
        let chosen = [key, hash]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(FALLBACK_IDENTITY);
        Identity(chosen.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the `"loadPage"` sentinel.
    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_IDENTITY
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Identity(s.to_string())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Identity(s)
    }
}

/// Fully namespaced key a scroll value is persisted under.
///
/// Wire format is `@@scroll|<identity>` or `@@scroll|<identity>|<subKey>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(String);

impl StateKey {
    /// Derive the key for an identity and optional sub-key.
    ///
    /// `Some("")` still appends the separator; only `None` omits it.
    pub fn new(identity: &Identity, sub_key: Option<&str>) -> Self {
        let mut key = String::with_capacity(
            STATE_KEY_PREFIX.len() + identity.as_str().len() + sub_key.map_or(0, |s| s.len() + 1),
        );
        key.push_str(STATE_KEY_PREFIX);
        key.push_str(identity.as_str());
        if let Some(sub) = sub_key {
            key.push('|');
            key.push_str(sub);
        }
        StateKey(key)
    }

    /// Derive the key for a location's own identity.
    pub fn for_location(location: &Location, sub_key: Option<&str>) -> Self {
        Self::new(&location.identity(), sub_key)
    }

    /// Split a raw persisted key back into identity and sub-key.
    ///
    /// Returns `None` for keys outside the namespace. Identities containing
    /// `|` split at their first separator.
    pub fn parse(raw: &str) -> Option<(Identity, Option<String>)> {
        let rest = raw.strip_prefix(STATE_KEY_PREFIX)?;
        match rest.split_once('|') {
            Some((identity, sub)) => Some((Identity::new(identity), Some(sub.to_string()))),
            None => Some((Identity::new(rest), None)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a raw key already known to be in the namespace.
    pub(crate) fn from_raw(raw: String) -> Self {
        StateKey(raw)
    }
}

impl fmt::Debug for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateKey({})", self.0)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StateKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Scroll offset persisted per state key, serialized as `[x, y]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

impl ScrollPosition {
    pub const TOP: ScrollPosition = ScrollPosition { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for ScrollPosition {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<ScrollPosition> for [f64; 2] {
    fn from(p: ScrollPosition) -> Self {
        [p.x, p.y]
    }
}

/// Kind of history transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Push,
    Pop,
    Replace,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Push => "PUSH",
            Action::Pop => "POP",
            Action::Replace => "REPLACE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location plus the transition that produced it, as handed to orchestrators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentLocation {
    #[serde(flatten)]
    pub location: Location,
    pub action: Action,
}
