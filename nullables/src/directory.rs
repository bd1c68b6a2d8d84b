//! Nullable directory with scripted participants.

use async_trait::async_trait;
use peerlink_directory::Directory;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A directory whose participants are set up by the test. Lookups ignore
/// the case of the login, like the platform does.
pub struct NullDirectory {
    /// lowercased login -> coalition name
    participants: Mutex<HashMap<String, Option<String>>>,
    existence_checks: AtomicUsize,
    coalition_lookups: AtomicUsize,
}

impl NullDirectory {
    pub fn new() -> Self {
        Self {
            participants: Mutex::new(HashMap::new()),
            existence_checks: AtomicUsize::new(0),
            coalition_lookups: AtomicUsize::new(0),
        }
    }

    /// Add a participant, optionally in a coalition.
    pub fn with_participant(self, login: &str, coalition: Option<&str>) -> Self {
        self.add_participant(login, coalition);
        self
    }

    pub fn add_participant(&self, login: &str, coalition: Option<&str>) {
        self.participants
            .lock()
            .unwrap()
            .insert(login.to_lowercase(), coalition.map(str::to_string));
    }

    /// Total calls to `participant_exists` + `get_coalition_name`.
    pub fn calls(&self) -> usize {
        self.existence_checks.load(Ordering::SeqCst) + self.coalition_lookups.load(Ordering::SeqCst)
    }
}

impl Default for NullDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Directory for NullDirectory {
    async fn participant_exists(&self, login: &str) -> bool {
        self.existence_checks.fetch_add(1, Ordering::SeqCst);
        self.participants
            .lock()
            .unwrap()
            .contains_key(&login.to_lowercase())
    }

    async fn get_coalition_name(&self, login: &str) -> Option<String> {
        self.coalition_lookups.fetch_add(1, Ordering::SeqCst);
        self.participants
            .lock()
            .unwrap()
            .get(&login.to_lowercase())
            .cloned()
            .flatten()
    }
}
