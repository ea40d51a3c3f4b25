use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Abstract key identifier bound to a lane.
///
/// The sink maps this to an OS-level key code; the scheduling core only
/// needs a stable identity per lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key(pub char);

impl Key {
    pub const SPACE: Key = Key(' ');
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == ' ' {
            write!(f, "Space")
        } else {
            write!(f, "{}", self.0.to_ascii_uppercase())
        }
    }
}

/// The raw input-injection boundary.
///
/// `press`/`release` assert or deassert a single key at the instant they are
/// called, with no internal timing. Calls are assumed near-instantaneous;
/// their latency is not compensated for and adds directly to timing error.
/// Implementations are shared across lane worker threads.
pub trait KeySink: Send + Sync {
    fn press(&self, key: Key);
    fn release(&self, key: Key);
}

/// Sink that discards all events. Useful for dry runs.
pub struct NullSink;

impl KeySink for NullSink {
    fn press(&self, _key: Key) {}
    fn release(&self, _key: Key) {}
}

/// Press or release, as observed by a [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

/// Sink that records every event in order. Test double.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(KeyAction, Key)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(KeyAction, Key)> {
        self.events.lock().unwrap().clone()
    }
}

impl KeySink for RecordingSink {
    fn press(&self, key: Key) {
        self.events.lock().unwrap().push((KeyAction::Press, key));
    }

    fn release(&self, key: Key) {
        self.events.lock().unwrap().push((KeyAction::Release, key));
    }
}
