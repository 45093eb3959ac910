//! The goal stack (spec §4.3), backed by the session slot
//! `convoGoalState`.
//!
//! Frames are ordered with index 0 as the stack top — see the doc
//! comment on `shortjson` for why that matches ShortJSON's leftmost-
//! removal law. `GoalStack` itself holds no state of its own; it is a
//! namespace of operations over whatever `Session` the caller hands it,
//! the same "operate on borrowed platform state, don't own it" shape
//! `dialog-engine-core::session` already pins for the `Session` trait.

use dialog_engine_core::{GoalFrame, Session, GOAL_STATE_SESSION_KEY};

use crate::shortjson;

pub struct GoalStack;

impl GoalStack {
    pub fn frames(session: &dyn Session) -> Vec<GoalFrame> {
        shortjson::decode(&session.get(GOAL_STATE_SESSION_KEY).unwrap_or_default())
    }

    pub fn names(session: &dyn Session) -> Vec<String> {
        Self::frames(session).into_iter().map(|f| f.key).collect()
    }

    pub fn set(session: &mut dyn Session, frames: &[GoalFrame]) {
        session.set(GOAL_STATE_SESSION_KEY, shortjson::encode(frames));
    }

    /// Pushes a new frame onto the top of the stack (index 0).
    pub fn append(session: &mut dyn Session, key: &str) {
        let sjn = session.get(GOAL_STATE_SESSION_KEY).unwrap_or_default();
        let sjn = shortjson::push(&sjn, &GoalFrame::new(key));
        session.set(GOAL_STATE_SESSION_KEY, sjn);
    }

    /// Removes the innermost (topmost) frame for `key`.
    pub fn remove(session: &mut dyn Session, key: &str) {
        let sjn = session.get(GOAL_STATE_SESSION_KEY).unwrap_or_default();
        let sjn = shortjson::remove(&sjn, key);
        session.set(GOAL_STATE_SESSION_KEY, sjn);
    }

    pub fn contains(session: &dyn Session, key: &str) -> bool {
        let sjn = session.get(GOAL_STATE_SESSION_KEY).unwrap_or_default();
        shortjson::contains(&sjn, key)
    }

    /// `depth` 0 is the most recently added frame.
    pub fn top(session: &dyn Session, depth: usize) -> Option<GoalFrame> {
        Self::frames(session).into_iter().nth(depth)
    }

    pub fn update_at(session: &mut dyn Session, depth: usize, frame: GoalFrame) {
        let mut frames = Self::frames(session);
        if let Some(slot) = frames.get_mut(depth) {
            *slot = frame;
        }
        Self::set(session, &frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialog_engine_core::InMemorySession;

    #[test]
    fn append_pushes_onto_top() {
        let mut session = InMemorySession::new();
        GoalStack::append(&mut session, "airline");
        GoalStack::append(&mut session, "confirmOrder");
        assert_eq!(GoalStack::names(&session), vec!["confirmOrder", "airline"]);
        assert_eq!(GoalStack::top(&session, 0).unwrap().key, "confirmOrder");
    }

    #[test]
    fn remove_drops_innermost_occurrence() {
        let mut session = InMemorySession::new();
        GoalStack::append(&mut session, "a");
        GoalStack::append(&mut session, "b");
        GoalStack::append(&mut session, "a");
        GoalStack::remove(&mut session, "a");
        assert_eq!(GoalStack::names(&session), vec!["b", "a"]);
    }

    #[test]
    fn update_at_marks_frame_queried() {
        let mut session = InMemorySession::new();
        GoalStack::append(&mut session, "airline");
        let mut frame = GoalStack::top(&session, 0).unwrap();
        frame.queried = true;
        GoalStack::update_at(&mut session, 0, frame);
        assert!(GoalStack::top(&session, 0).unwrap().queried);
    }

    #[test]
    fn contains_and_empty_stack() {
        let session = InMemorySession::new();
        assert!(!GoalStack::contains(&session, "airline"));
        assert_eq!(GoalStack::top(&session, 0), None);
    }
}
