//! The `Responder` seam (spec §4.5, "Response facade").
//!
//! `Responder` is the trait an author's resolver actually sees. The
//! concrete implementation (`dialog-engine-runtime::Response`) owns the
//! `OutputManager`, the session, the goal stack and the persistent store;
//! this crate only needs the trait so `IntentDef`/`GoalDef` resolvers can
//! be typed without `dialog-engine-core` depending on the runtime crate.

use async_trait::async_trait;

use crate::error::ResolverError;
use crate::goal::SpokenPhrases;

/// What a resolver's return value means for the goal stack (spec §4.6):
/// "if result in {true, undefined}: stack.remove(frame.key)".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Remove the frame this resolver was invoked for (`true` / no value).
    Resolved,
    /// Leave the frame in place — used by dependency chaining (spec §4.5,
    /// `goalFilled`, and scenario S3).
    Pending,
}

/// Operations exposed to author callbacks (spec §4.5).
#[async_trait]
pub trait Responder: Send {
    /// Queue spoken statements. Sequential calls join with a pause unless
    /// `quick` is set.
    fn say(&mut self, phrases: SpokenPhrases, quick: bool);

    /// Queue a question fragment, counted at weight 0.34 toward `asked`.
    fn prompt(&mut self, phrases: SpokenPhrases);

    /// Queue a question fragment, counted at weight 1.0 toward `asked`.
    fn ask(&mut self, phrases: SpokenPhrases);

    /// Resolve a `{{name}}` session variable, `[[name]]` request-slot
    /// alias, or `<<record.field>>` persistent-record reference.
    fn get(&self, reference: &str) -> Option<String>;

    /// Write a `{{name}}` session variable or `<<record.field>>`
    /// persistent-record field. `[[name]]` slot aliases are read-only and
    /// attempting to set one is a no-op.
    fn set(&mut self, reference: &str, value: String);

    /// Fetch a record from the persistent store (spec §4.5, `load`).
    /// Returns `true` if a record was found and is now addressable via
    /// `<<record.field>>`.
    async fn load(
        &mut self,
        record: &str,
        key_field: &str,
        key_value: &str,
        where_clause: Option<&str>,
    ) -> Result<bool, ResolverError>;

    /// Upsert the named record's currently-loaded fields (spec §4.5, `store`).
    async fn store(&mut self, record: &str) -> Result<(), ResolverError>;

    /// Push a goal frame onto the stack.
    fn add_goal(&mut self, key: &str);

    /// Remove the innermost frame for `key`.
    fn clear_goal(&mut self, key: &str);

    /// True if `key` is on the stack at any depth.
    fn has_goal(&self, key: &str) -> bool;

    /// Dependency gate: if `slot_ref` resolves to a value, returns `true`
    /// ("dependency met"). Otherwise queues `child_key` onto the stack and
    /// returns `false` ("dependency not met") so the caller can bail out
    /// without removing its own frame.
    fn goal_filled(&mut self, child_key: &str, slot_ref: &str) -> bool;

    /// Request the session close at the end of this turn (overriding the
    /// engine's "keep session open" default).
    fn request_close(&mut self);
}
