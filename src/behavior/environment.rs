//! Browsing-context detection.

/// Whether an interactive browsing context exists.
///
/// Scroll restoration only makes sense with a navigable, scrollable view.
/// Server-side rendering and other headless runs get
/// [`Environment::Headless`], and [`create`](super::create) then yields no
/// behavior at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Interactive,
    Headless,
}

impl Environment {
    /// Best guess for the current build target.
    ///
    /// Browser wasm builds are interactive; everything else is headless
    /// unless the embedder says otherwise.
    pub fn current() -> Self {
        if cfg!(all(target_arch = "wasm32", target_os = "unknown")) {
            Environment::Interactive
        } else {
            Environment::Headless
        }
    }

    pub fn is_interactive(self) -> bool {
        self == Environment::Interactive
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::current()
    }
}
