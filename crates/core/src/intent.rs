//! Intents (spec §3, "IntentDef").
//!
//! An `IntentDef` pairs a set of author-written utterance templates with
//! a resolver. When `goal` is set the intent only matches while that goal
//! is on the stack (spec §4.6, step 3 — the goal-context walk); when it
//! is `None` the intent is global and the single-definition fast path in
//! `InputManager` applies.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::ResolverError;
use crate::response::{ResolveOutcome, Responder};

/// The normalized shape every author resolver collapses to (spec §5,
/// "Heterogeneous resolver returns"). Rust has no plain-value/promise/
/// generator distinction to normalize — a resolver is just an `async fn`.
pub type ResolverFn = Arc<
    dyn for<'a> Fn(&'a mut dyn Responder) -> BoxFuture<'a, Result<ResolveOutcome, ResolverError>>
        + Send
        + Sync,
>;

/// An author-declared intent definition (spec §3, "IntentDef").
#[derive(Clone)]
pub struct IntentDef {
    /// Author-supplied or auto-generated (alphabetic, digit-free — spec
    /// §9, open question 1).
    pub name: Option<String>,
    /// Scopes the intent to a goal: it only matches while `goal` is on
    /// the stack. `None` means the intent is global.
    pub goal: Option<String>,
    pub expecting: Vec<String>,
    pub resolve: ResolverFn,
}

impl std::fmt::Debug for IntentDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentDef")
            .field("name", &self.name)
            .field("goal", &self.goal)
            .field("expecting", &self.expecting)
            .finish()
    }
}

impl IntentDef {
    /// Whether this utterance appears in `expecting` (used to tell local
    /// intents from global ones during compilation).
    pub fn expects(&self, utterance: &str) -> bool {
        self.expecting.iter().any(|e| e == utterance)
    }
}
