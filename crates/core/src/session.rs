//! The per-turn session scope (spec §3, "Session").
//!
//! A key→string mapping supplied by the platform for the duration of one
//! logical conversation. The goal stack lives under the reserved key
//! [`GOAL_STATE_SESSION_KEY`]; no other key is reserved.

use std::collections::HashMap;

/// The one reserved session key (spec §6).
pub const GOAL_STATE_SESSION_KEY: &str = "convoGoalState";

/// Abstraction over the platform-supplied session scope.
///
/// Implementations wrap whatever stringly-typed store the host platform
/// hands the adapter; the engine never assumes a concrete backend.
pub trait Session: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn attributes(&self) -> HashMap<String, String>;
}

/// A plain in-memory session, used in tests and as the simplest possible
/// adapter-side implementation.
#[derive(Debug, Default, Clone)]
pub struct InMemorySession(HashMap<String, String>);

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Session for InMemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), value);
    }

    fn attributes(&self) -> HashMap<String, String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_values() {
        let mut session = InMemorySession::new();
        session.set("name", "Rahul".to_string());
        assert_eq!(session.get("name"), Some("Rahul".to_string()));
        assert_eq!(session.get("missing"), None);
    }
}
