//! In-memory navigation history.

use super::{History, Listener, ListenerId, ListenerRegistry};
use crate::types::{Action, Location};
use parking_lot::Mutex;

/// Length of generated location keys.
const KEY_LENGTH: usize = 6;

struct Entries {
    stack: Vec<Location>,
    index: usize,
    action: Action,
    /// Counter feeding generated keys.
    next_key: u64,
}

/// Navigation stack held in memory.
///
/// The initial entry has no key, like the first page of a browser session;
/// every pushed or replaced entry gets a fresh key.
pub struct MemoryHistory {
    entries: Mutex<Entries>,
    listeners: ListenerRegistry,
}

impl MemoryHistory {
    /// History positioned at `initial` (a path such as `/docs?q=1#intro`).
    pub fn new(initial: &str) -> Self {
        Self {
            entries: Mutex::new(Entries {
                stack: vec![parse_path(initial)],
                index: 0,
                action: Action::Pop,
                next_key: 1,
            }),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Navigate to a new entry, discarding any forward entries.
    pub fn push(&self, path: &str) -> Location {
        let location = {
            let mut entries = self.entries.lock();
            let location = entries.keyed(path);
            let next = entries.index + 1;
            entries.stack.truncate(next);
            entries.stack.push(location.clone());
            entries.index = next;
            entries.action = Action::Push;
            location
        };
        self.listeners.notify(&location, Action::Push);
        location
    }

    /// Swap the current entry for a new one.
    pub fn replace(&self, path: &str) -> Location {
        let location = {
            let mut entries = self.entries.lock();
            let location = entries.keyed(path);
            let index = entries.index;
            entries.stack[index] = location.clone();
            entries.action = Action::Replace;
            location
        };
        self.listeners.notify(&location, Action::Replace);
        location
    }

    /// Move `delta` entries through the stack.
    ///
    /// Out-of-range moves are ignored and return `None`.
    pub fn go(&self, delta: isize) -> Option<Location> {
        let location = {
            let mut entries = self.entries.lock();
            let target = entries.index.checked_add_signed(delta)?;
            if target >= entries.stack.len() || delta == 0 {
                return None;
            }
            entries.index = target;
            entries.action = Action::Pop;
            entries.stack[target].clone()
        };
        self.listeners.notify(&location, Action::Pop);
        Some(location)
    }

    pub fn back(&self) -> Option<Location> {
        self.go(-1)
    }

    pub fn forward(&self) -> Option<Location> {
        self.go(1)
    }

    /// Number of entries in the stack.
    pub fn len(&self) -> usize {
        self.entries.lock().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().stack.is_empty()
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.entries.lock().index
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Entries {
    fn keyed(&mut self, path: &str) -> Location {
        let key = format_key(self.next_key);
        self.next_key += 1;
        parse_path(path).with_key(key)
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        let entries = self.entries.lock();
        entries.stack[entries.index].clone()
    }

    fn action(&self) -> Action {
        self.entries.lock().action
    }

    fn listen(&self, listener: Listener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn unlisten(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

/// Split `/path?query#hash` into a location without a key.
fn parse_path(path: &str) -> Location {
    let (rest, hash) = match path.find('#') {
        Some(i) => (&path[..i], Some(path[i..].to_string())),
        None => (path, None),
    };
    let (pathname, search) = match rest.find('?') {
        Some(i) => (&rest[..i], rest[i..].to_string()),
        None => (rest, String::new()),
    };

    Location {
        key: None,
        hash: hash.filter(|h| h.len() > 1),
        pathname: if pathname.is_empty() { "/".to_string() } else { pathname.to_string() },
        search,
        state: None,
    }
}

/// Zero-padded base-36 key, scrambled so consecutive keys look unrelated.
fn format_key(counter: u64) -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let modulus = 36u64.pow(KEY_LENGTH as u32);
    // 1_000_003 is prime and coprime with 36^6, so this is a bijection
    let mut n = counter.wrapping_mul(1_000_003) % modulus;

    let mut key = [b'0'; KEY_LENGTH];
    for slot in key.iter_mut().rev() {
        *slot = ALPHABET[(n % 36) as usize];
        n /= 36;
    }
    String::from_utf8_lossy(&key).into_owned()
}
