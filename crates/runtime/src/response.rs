//! The concrete `Response` (spec §4.5), wiring `GoalStack`,
//! `OutputManager`, `Session` and `PersistentStore` behind the
//! `Responder` trait author resolvers are actually typed against.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rand::RngCore;

use dialog_engine_core::{
    DispatchWarning, PersistentStore, RecordInstance, ResolveOutcome, Responder, ResolverError,
    Session, SpokenPhrases,
};

use crate::goal_stack::GoalStack;
use crate::output::{pick_and_interpolate, OutputManager};

fn strip_delims<'a>(reference: &'a str, open: &str, close: &str) -> Option<&'a str> {
    reference
        .strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
}

/// Resolves `{{name}}` / `[[name]]` / `<<record.field>>` against the
/// session and whatever records have been `load`ed this turn. A free
/// function (not a `Response` method) so it can be captured by a
/// closure without re-borrowing `self` mutably at the same time.
fn resolve_reference(
    session: &dyn Session,
    records: &HashMap<String, RecordInstance>,
    reference: &str,
) -> Option<String> {
    if let Some(name) = strip_delims(reference, "{{", "}}") {
        session.get(name)
    } else if let Some(name) = strip_delims(reference, "[[", "]]") {
        session.get(name)
    } else if let Some(path) = strip_delims(reference, "<<", ">>") {
        let (record, field) = path.split_once('.')?;
        records.get(record).and_then(|r| r.field(field).map(str::to_string))
    } else {
        None
    }
}

/// Per-turn object passed to author callbacks (spec §4.5).
pub struct Response<'a> {
    session: &'a mut dyn Session,
    store: Option<Arc<dyn PersistentStore>>,
    loaded_records: HashMap<String, RecordInstance>,
    output: OutputManager,
    rng: Box<dyn RngCore + Send>,
    goal_state_changed: bool,
    warnings: Vec<DispatchWarning>,
}

impl<'a> Response<'a> {
    pub fn new(
        session: &'a mut dyn Session,
        store: Option<Arc<dyn PersistentStore>>,
        output: OutputManager,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            session,
            store,
            loaded_records: HashMap::new(),
            output,
            rng,
            goal_state_changed: false,
            warnings: Vec::new(),
        }
    }

    pub fn session(&self) -> &dyn Session {
        self.session
    }

    pub fn session_mut(&mut self) -> &mut dyn Session {
        self.session
    }

    pub fn output(&self) -> &OutputManager {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut OutputManager {
        &mut self.output
    }

    pub fn warnings(&self) -> &[DispatchWarning] {
        &self.warnings
    }

    pub fn push_warning(&mut self, warning: DispatchWarning) {
        self.warnings.push(warning);
    }

    /// Resets the goal-loop cursor to 0 on the next iteration (spec
    /// §4.5): "Setting `goalStateChanged = true` resets the loop cursor
    /// to 0 so newly-pushed goals are considered next."
    pub fn mark_goal_state_changed(&mut self) {
        self.goal_state_changed = true;
    }

    /// Reads and clears the flag in one step, for the goal loop's own
    /// per-iteration check.
    pub fn take_goal_state_changed(&mut self) -> bool {
        std::mem::take(&mut self.goal_state_changed)
    }

    /// `_pickAndInterpolate`: picks (if given a list) then substitutes
    /// every `{{var}}` against the current session state.
    pub fn render(&mut self, phrases: &SpokenPhrases) -> String {
        let session = &*self.session;
        pick_and_interpolate(phrases, self.rng.as_mut(), &mut |name| session.get(name))
    }

    /// Upcasts to the trait object a `ResolverFn` actually expects.
    pub fn as_responder(&mut self) -> &mut dyn Responder {
        self
    }
}

#[async_trait]
impl<'a> Responder for Response<'a> {
    fn say(&mut self, phrases: SpokenPhrases, quick: bool) {
        let text = self.render(&phrases);
        self.output.say(text, quick);
    }

    fn prompt(&mut self, phrases: SpokenPhrases) {
        let text = self.render(&phrases);
        self.output.prompt(text);
    }

    fn ask(&mut self, phrases: SpokenPhrases) {
        let text = self.render(&phrases);
        self.output.ask(text);
    }

    fn get(&self, reference: &str) -> Option<String> {
        resolve_reference(self.session, &self.loaded_records, reference)
    }

    fn set(&mut self, reference: &str, value: String) {
        if let Some(name) = strip_delims(reference, "{{", "}}") {
            self.session.set(name, value);
        } else if let Some(path) = strip_delims(reference, "<<", ">>") {
            if let Some((record, field)) = path.split_once('.') {
                self.loaded_records
                    .entry(record.to_string())
                    .or_insert_with(|| RecordInstance::new(record.to_string(), String::new()))
                    .set_field(field.to_string(), value);
            }
        }
        // `[[name]]` request-slot aliases are read-only (spec §4.5).
    }

    async fn load(
        &mut self,
        record: &str,
        key_field: &str,
        key_value: &str,
        where_clause: Option<&str>,
    ) -> Result<bool, ResolverError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| ResolverError::new("no persistent store configured"))?;
        match store.load(record, key_field, key_value, where_clause).await {
            Ok(Some(instance)) => {
                self.loaded_records.insert(record.to_string(), instance);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(err) => Err(ResolverError::from_source(err)),
        }
    }

    async fn store(&mut self, record: &str) -> Result<(), ResolverError> {
        let instance = self
            .loaded_records
            .get(record)
            .ok_or_else(|| ResolverError::new(format!("record `{record}` has not been loaded")))?;
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| ResolverError::new("no persistent store configured"))?;
        store.store(instance).await.map_err(ResolverError::from_source)
    }

    fn add_goal(&mut self, key: &str) {
        GoalStack::append(self.session, key);
        self.goal_state_changed = true;
    }

    fn clear_goal(&mut self, key: &str) {
        GoalStack::remove(self.session, key);
        self.goal_state_changed = true;
    }

    fn has_goal(&self, key: &str) -> bool {
        GoalStack::contains(self.session, key)
    }

    fn goal_filled(&mut self, child_key: &str, slot_ref: &str) -> bool {
        let filled = self.get(slot_ref).map(|v| !v.is_empty()).unwrap_or(false);
        if filled {
            true
        } else {
            self.add_goal(child_key);
            false
        }
    }

    fn request_close(&mut self) {
        self.output.request_close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialog_engine_config::EngineSettings;
    use dialog_engine_core::InMemorySession;
    use rand::rngs::mock::StepRng;

    fn response<'a>(session: &'a mut dyn Session) -> Response<'a> {
        Response::new(
            session,
            None,
            OutputManager::new(&EngineSettings::default()),
            Box::new(StepRng::new(0, 1)),
        )
    }

    #[test]
    fn get_set_session_variable() {
        let mut session = InMemorySession::new();
        let mut r = response(&mut session);
        r.set("{{name}}", "Rahul".to_string());
        assert_eq!(r.get("{{name}}"), Some("Rahul".to_string()));
    }

    #[test]
    fn slot_alias_reads_session_but_ignores_writes() {
        let mut session = InMemorySession::new();
        session.set("airline", "Delta".to_string());
        let mut r = response(&mut session);
        assert_eq!(r.get("[[airline]]"), Some("Delta".to_string()));
        r.set("[[airline]]", "United".to_string());
        assert_eq!(r.get("[[airline]]"), Some("Delta".to_string()));
    }

    #[test]
    fn say_interpolates_session_variable() {
        let mut session = InMemorySession::new();
        session.set("name", "Rahul".to_string());
        let mut r = response(&mut session);
        r.say("Hi {{name}}".into(), false);
        assert_eq!(r.output().compose(), "Hi Rahul");
    }

    #[test]
    fn goal_filled_queues_child_when_slot_empty() {
        let mut session = InMemorySession::new();
        let mut r = response(&mut session);
        assert!(!r.goal_filled("bloodSugar", "[[bloodSugar]]"));
        assert!(r.has_goal("bloodSugar"));
    }

    #[test]
    fn goal_filled_true_when_slot_present() {
        let mut session = InMemorySession::new();
        session.set("bloodSugar", "120".to_string());
        let mut r = response(&mut session);
        assert!(r.goal_filled("bloodSugar", "[[bloodSugar]]"));
        assert!(!r.has_goal("bloodSugar"));
    }

    #[test]
    fn request_close_sets_should_end_session() {
        let mut session = InMemorySession::new();
        let mut r = response(&mut session);
        r.request_close();
        assert!(r.output().should_end_session());
    }
}
