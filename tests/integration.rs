//! Integration tests: scroll restoration across realistic navigation.

use parking_lot::Mutex;
use scroll_keeper::{
    create, Action, BackingStore, CurrentLocation, Environment, FileBackend, FileBackendConfig,
    History, Identity, Location, MemoryBackend, MemoryHistory, PreviousIdentity, ScrollBehavior,
    ScrollBehaviorOptions, ScrollDecision, ScrollPosition, SessionStorage, StateStorage,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

/// Minimal stand-in for the scroll orchestrator: saves the window offset on
/// departure and resolves the offset to apply on arrival.
struct Orchestrator {
    behavior: ScrollBehavior,
    window_y: Mutex<f64>,
    last: Mutex<Option<CurrentLocation>>,
}

impl Orchestrator {
    fn new(behavior: ScrollBehavior) -> Self {
        let last = behavior.current_location();
        Self {
            behavior,
            window_y: Mutex::new(0.0),
            last: Mutex::new(Some(last)),
        }
    }

    fn scroll_to(&self, y: f64) {
        *self.window_y.lock() = y;
    }

    fn y(&self) -> f64 {
        *self.window_y.lock()
    }

    /// Save the page being left, then mark it as departed.
    fn before_transition(&self) {
        let here = self.behavior.current_location().location;
        let y = self.y();
        self.behavior
            .state_storage()
            .save(&here, None, &json!(ScrollPosition::new(0.0, y)));
        self.behavior.track_departure();
    }

    /// Apply the restored (or reset) position for the new location.
    fn after_transition(&self) {
        let current = self.behavior.current_location();
        let previous = self.last.lock().replace(current.clone());
        if self.behavior.manual() {
            return;
        }

        match self.behavior.should_update_scroll(previous.as_ref(), &current) {
            ScrollDecision::Restore => {
                let saved = self
                    .behavior
                    .state_storage()
                    .read(&current.location, None)
                    .and_then(|v| serde_json::from_value::<ScrollPosition>(v).ok());
                self.scroll_to(saved.unwrap_or(ScrollPosition::TOP).y);
            }
            ScrollDecision::ScrollTo(pos) => self.scroll_to(pos.y),
            ScrollDecision::Skip | ScrollDecision::ScrollToElement(_) => {}
        }
    }
}

fn orchestrated(
    history: &Arc<MemoryHistory>,
    options: ScrollBehaviorOptions,
) -> Orchestrator {
    let h: Arc<dyn History> = history.clone();
    Orchestrator::new(create(options, h, Environment::Interactive).unwrap())
}

// --- Realistic Workflow Tests ---

#[test]
fn test_back_restores_and_push_resets() {
    let history = Arc::new(MemoryHistory::new("/"));
    let app = orchestrated(&history, ScrollBehaviorOptions::default());

    // Browse the index, scroll down, open an article
    app.before_transition();
    history.push("/articles");
    app.after_transition();
    assert_eq!(app.y(), 0.0);

    app.scroll_to(1200.0);
    app.before_transition();
    history.push("/articles/42");
    app.after_transition();
    assert_eq!(app.y(), 0.0, "fresh navigation starts at the top");

    app.scroll_to(300.0);
    app.before_transition();
    history.back();
    app.after_transition();
    assert_eq!(app.y(), 1200.0, "back restores the list position");

    app.before_transition();
    history.forward();
    app.after_transition();
    assert_eq!(app.y(), 300.0, "forward restores the article position");
}

#[test]
fn test_manual_mode_leaves_scroll_alone() {
    let history = Arc::new(MemoryHistory::new("/"));
    let app = orchestrated(&history, ScrollBehaviorOptions::default().manual(true));

    app.before_transition();
    history.push("/a");
    app.scroll_to(50.0);
    app.before_transition();
    history.back();
    app.after_transition();

    assert_eq!(app.y(), 50.0);
}

#[test]
fn test_policy_controls_restoration() {
    let history = Arc::new(MemoryHistory::new("/"));
    let options = ScrollBehaviorOptions::default().with_policy(|_, current| {
        if current.location.pathname.starts_with("/modal") {
            ScrollDecision::Skip
        } else if current.action == Action::Push {
            ScrollDecision::ScrollTo(ScrollPosition::new(0.0, 64.0))
        } else {
            ScrollDecision::Restore
        }
    });
    let app = orchestrated(&history, options);

    app.scroll_to(700.0);
    app.before_transition();
    history.push("/modal/login");
    app.after_transition();
    assert_eq!(app.y(), 700.0);

    app.before_transition();
    history.push("/next");
    app.after_transition();
    assert_eq!(app.y(), 64.0);
}

// --- Sub-key Re-parenting ---

#[test]
fn test_element_scroll_follows_departed_page() {
    let history = Arc::new(MemoryHistory::new("/"));
    let storage = Arc::new(SessionStorage::in_memory());
    let app = orchestrated(
        &history,
        ScrollBehaviorOptions::default().with_storage(storage.clone()),
    );

    let feed = history.push("/feed");
    app.before_transition();
    history.push("/profile");
    app.after_transition();

    // The sidebar of the feed reports its scroll late, while history
    // already shows /profile
    let now = history.location();
    storage.save_as(&now, Some("sidebar"), &ScrollPosition::new(0.0, 88.0));

    assert_eq!(
        storage.read_as::<ScrollPosition>(&feed, Some("sidebar")),
        Some(ScrollPosition::new(0.0, 88.0))
    );
    assert!(storage
        .read_as::<ScrollPosition>(&now, Some("sidebar"))
        .is_none());
}

#[test]
fn test_sub_key_filed_under_departed_key() {
    let storage = SessionStorage::in_memory();
    storage.notify_departure("pageA");

    let outcome = storage.save_as(
        &Location::new("/b").with_key("pageB").with_hash("#h"),
        Some("subkey1"),
        &json!({"x": 0, "y": 10}),
    );

    assert_eq!(outcome.state_key().as_str(), "@@scroll|pageA|subkey1");
    assert_eq!(
        storage
            .backend()
            .get_item("@@scroll|pageA|subkey1")
            .unwrap()
            .as_deref(),
        Some(r#"{"x":0,"y":10}"#)
    );
}

#[test]
fn test_storages_isolated_unless_sharing_previous() {
    let a = SessionStorage::in_memory();
    let b = SessionStorage::in_memory();
    a.notify_departure("pageA");
    assert!(b.previous_identity().is_none());

    let shared = PreviousIdentity::new();
    let c = SessionStorage::with_previous(MemoryBackend::new(), shared.clone());
    let d = SessionStorage::with_previous(MemoryBackend::new(), shared);
    c.notify_departure("pageC");
    d.save_as(&Location::new("/"), Some("list"), &json!([0, 1]));

    assert_eq!(d.previous_identity(), Some(Identity::new("pageC")));
    assert!(d
        .state_keys()
        .iter()
        .any(|k| k.as_str() == "@@scroll|pageC|list"));
}

// --- Persistence ---

#[test]
fn test_positions_survive_restart_with_file_backend() {
    let dir = TempDir::new().unwrap();
    let config = FileBackendConfig {
        path: dir.path().join("scroll"),
        ..Default::default()
    };
    let article = Location::new("/articles/7").with_key("ab12cd");

    {
        let storage = SessionStorage::new(FileBackend::open(config.clone()).unwrap());
        storage.save_as(&article, None, &ScrollPosition::new(0.0, 2048.0));
        storage.notify_departure("ab12cd");
        storage.save_as(&Location::new("/x"), Some("toc"), &ScrollPosition::new(0.0, 12.0));
    }

    let storage = SessionStorage::new(FileBackend::open(config).unwrap());
    assert_eq!(
        storage.read_as::<ScrollPosition>(&article, None),
        Some(ScrollPosition::new(0.0, 2048.0))
    );
    assert_eq!(
        storage.read_as::<ScrollPosition>(&article, Some("toc")),
        Some(ScrollPosition::new(0.0, 12.0))
    );
    // Previous identity is process state and starts unset again
    assert!(storage.previous_identity().is_none());
}

#[test]
fn test_trait_object_storage_through_adapter() {
    let history = Arc::new(MemoryHistory::new("/#top"));
    let storage: Arc<dyn StateStorage> = Arc::new(SessionStorage::in_memory());
    let h: Arc<dyn History> = history.clone();
    let behavior = create(
        ScrollBehaviorOptions::default().with_storage(Arc::clone(&storage)),
        h,
        Environment::Interactive,
    )
    .unwrap();

    // Initial entry has only a hash
    assert_eq!(behavior.track_departure().as_str(), "#top");
    storage.save(&history.push("/next"), Some("pane"), &json!([0, 4]));

    assert_eq!(
        storage.read(&Location::new("/").with_hash("#top"), Some("pane")),
        Some(json!([0, 4]))
    );
}
