//! `ConversationEngine` (spec §4.7): the registration surface an author
//! script calls into, and the compile step that turns it into a frozen,
//! platform-ready intent table.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dialog_engine_config::EngineSettings;
use dialog_engine_core::{
    ErrorHandler, GoalDef, IntentDef, IntentHandler, IntentRegistration, PersistentStore,
    PhraseEquivalentSet, PhraseEquivalents, PlatformAdapter, PlatformRequest, RegistrationError,
    ResolveOutcome, ResolverFn, Responder, SlotType, SlotTypeRegistry,
};

use crate::input_manager::{dispatch, dispatch_launch, EngineShared};
use crate::script_parser;

struct PendingIntent {
    def: IntentDef,
}

/// The registration surface (spec §4.7). Accumulates author
/// declarations; `register_intents` compiles and freezes them.
pub struct ConversationEngine {
    slot_types: SlotTypeRegistry,
    phrase_equivalents: PhraseEquivalents,
    goals: HashMap<String, GoalDef>,
    top_level_goals: Vec<String>,
    launch_phrases: Vec<String>,
    close_requests: Vec<String>,
    pending_intents: Vec<PendingIntent>,
    settings: EngineSettings,
    store: Option<Arc<dyn PersistentStore>>,
    compiled: bool,
}

impl ConversationEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            slot_types: SlotTypeRegistry::new(),
            phrase_equivalents: PhraseEquivalents::new(),
            goals: HashMap::new(),
            top_level_goals: Vec::new(),
            launch_phrases: Vec::new(),
            close_requests: Vec::new(),
            pending_intents: Vec::new(),
            settings,
            store: None,
            compiled: false,
        }
    }

    fn assert_not_compiled(&self) {
        assert!(
            !self.compiled,
            "cannot register after `register_intents` has been called"
        );
    }

    /// `addInputTypes`: idempotent per key, last write wins.
    pub fn add_input_types(&mut self, types: impl IntoIterator<Item = (String, SlotType)>) {
        self.assert_not_compiled();
        for (name, slot_type) in types {
            self.slot_types.insert(name, slot_type);
        }
    }

    /// `addPhraseEquivalents`.
    pub fn add_phrase_equivalents(&mut self, sets: impl IntoIterator<Item = PhraseEquivalentSet>) {
        self.assert_not_compiled();
        self.phrase_equivalents.extend(sets);
    }

    /// `respondTo`: indexes `def` under every utterance in `expecting`.
    /// An utterance shared by more than one registered def becomes a
    /// *global intent*, resolved at dispatch time by the goal-stack walk.
    pub fn respond_to(&mut self, def: IntentDef) {
        self.assert_not_compiled();
        self.pending_intents.push(PendingIntent { def });
    }

    /// `defineGoal`: registers a goal, desugaring any nested
    /// `respond_to` entries into top-level intents scoped to this
    /// goal's key.
    pub fn define_goal(&mut self, goal: GoalDef) -> Result<(), RegistrationError> {
        self.assert_not_compiled();
        let key = goal.key().to_string();
        if self.goals.contains_key(&key) {
            return Err(RegistrationError::DuplicateGoalKey(key));
        }
        if let GoalDef::Query { respond_to, .. } = &goal {
            for child in respond_to {
                let mut scoped = child.clone();
                scoped.goal = Some(key.clone());
                self.pending_intents.push(PendingIntent { def: scoped });
            }
        }
        self.goals.insert(key, goal);
        Ok(())
    }

    /// `addTopLevelGoal`: a goal the engine pushes on every launch.
    pub fn add_top_level_goal(&mut self, key: impl Into<String>) {
        self.assert_not_compiled();
        self.top_level_goals.push(key.into());
    }

    pub fn set_launch_phrases(&mut self, phrases: impl IntoIterator<Item = String>) {
        self.assert_not_compiled();
        self.launch_phrases = phrases.into_iter().collect();
    }

    /// `setCloseRequests`: utterances that, when matched, end the
    /// session. Desugars to a synthetic intent calling `request_close`.
    pub fn set_close_requests(&mut self, phrases: impl IntoIterator<Item = String>) {
        self.assert_not_compiled();
        self.close_requests = phrases.into_iter().collect();
    }

    pub fn set_spoken_rate(&mut self, rate: impl Into<String>) {
        self.assert_not_compiled();
        self.settings.spoken_rate = Some(rate.into());
    }

    pub fn set_persistent_store(&mut self, store: Arc<dyn PersistentStore>) {
        self.assert_not_compiled();
        self.store = Some(store);
    }

    fn close_requests_resolver() -> ResolverFn {
        use futures::future::FutureExt;
        Arc::new(move |responder: &mut dyn Responder| {
            async move {
                responder.request_close();
                Ok(ResolveOutcome::Resolved)
            }
            .boxed()
        })
    }

    /// Generates a digit-free alphabetic name (`a`, `b`, ..., `z`, `aa`,
    /// ...), skipping anything already taken by an author-supplied or
    /// previously generated name (spec §9, open question 1).
    fn auto_name(index: usize, used: &mut HashSet<String>) -> String {
        const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
        let mut n = index;
        let mut letters = Vec::new();
        loop {
            letters.push(LETTERS[n % 26]);
            n /= 26;
            if n == 0 {
                break;
            }
            n -= 1;
        }
        letters.reverse();
        let mut candidate = format!("intent_{}", String::from_utf8(letters).unwrap());
        while used.contains(&candidate) {
            candidate.push('x');
        }
        used.insert(candidate.clone());
        candidate
    }

    fn slug(utterance: &str) -> String {
        utterance
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect()
    }

    fn build_handler(intent_name: String, candidates: Arc<Vec<IntentDef>>, shared: Arc<EngineShared>) -> IntentHandler {
        Arc::new(move |request| {
            let shared = shared.clone();
            let candidates = candidates.clone();
            let intent_name = intent_name.clone();
            Box::pin(async move {
                let error_handler = Self::default_error_handler();
                dispatch(&intent_name, &candidates, request, &shared, &error_handler).await;
            })
        })
    }

    fn default_error_handler() -> ErrorHandler {
        use futures::future::FutureExt;
        Arc::new(|request: &mut dyn PlatformRequest, err| {
            let message = err.to_string();
            async move {
                tracing::error!(error = %message, "resolver failed");
                request.say("Sorry, something went wrong. Please try again.".to_string());
                request.set_should_end_session(false);
            }
            .boxed()
        })
    }

    /// `registerIntents`: the compile step (spec §4.7). Classifies raw
    /// (pre-`ScriptParser`) utterances as local (owned by exactly one
    /// def) or global (shared across defs), emits one platform-intent
    /// per local def and one per global utterance, registers
    /// custom-enum slot values, then freezes the tables.
    pub async fn register_intents(mut self, platform: &mut dyn PlatformAdapter) -> Result<(), RegistrationError> {
        self.slot_types.validate()?;

        if !self.close_requests.is_empty() {
            self.pending_intents.push(PendingIntent {
                def: IntentDef {
                    name: None,
                    goal: None,
                    expecting: self.close_requests.clone(),
                    resolve: Self::close_requests_resolver(),
                },
            });
        }

        let mut used_names: HashSet<String> = self
            .pending_intents
            .iter()
            .filter_map(|p| p.def.name.clone())
            .collect();
        let mut defs: Vec<IntentDef> = Vec::with_capacity(self.pending_intents.len());
        let mut auto_index = 0usize;
        for pending in self.pending_intents.drain(..) {
            let mut def = pending.def;
            if def.name.is_none() {
                def.name = Some(Self::auto_name(auto_index, &mut used_names));
                auto_index += 1;
            }
            defs.push(def);
        }

        let mut seen_names: HashSet<String> = HashSet::new();
        for def in &defs {
            if let Some(name) = &def.name {
                if !seen_names.insert(name.clone()) {
                    return Err(RegistrationError::DuplicateIntentName(name.clone()));
                }
            }
        }

        // Classify every raw utterance as local (owned by exactly one
        // def) or global (shared across defs) before any ScriptParser
        // expansion, per spec §4.7's compile step.
        let mut owners: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, def) in defs.iter().enumerate() {
            for utterance in &def.expecting {
                let idxs = owners.entry(utterance.clone()).or_default();
                if !idxs.contains(&idx) {
                    idxs.push(idx);
                }
            }
        }
        let mut local_groups: HashMap<usize, Vec<String>> = HashMap::new();
        let mut global_utterances: Vec<String> = Vec::new();
        for (utterance, idxs) in &owners {
            if idxs.len() == 1 {
                local_groups.entry(idxs[0]).or_default().push(utterance.clone());
            } else {
                global_utterances.push(utterance.clone());
            }
        }

        let shared = Arc::new(EngineShared {
            goals: self.goals.clone(),
            settings: self.settings.clone(),
            store: self.store.clone(),
        });

        let mut warnings = Vec::new();
        for (idx, def) in defs.iter().enumerate() {
            let Some(raw) = local_groups.get(&idx) else {
                continue;
            };
            let parsed = script_parser::parse(raw, &self.slot_types, &self.phrase_equivalents, &mut warnings);
            let registration = IntentRegistration {
                utterances: parsed.utterances,
                slots: parsed.slots,
            };
            let name = def.name.clone().expect("every def is named by this point");
            let candidates = Arc::new(vec![def.clone()]);
            platform
                .reg_intent(&name, registration, Self::build_handler(name.clone(), candidates, shared.clone()))
                .await?;
        }

        for utterance in &global_utterances {
            let sharing: Vec<IntentDef> = owners[utterance].iter().map(|&idx| defs[idx].clone()).collect();
            let parsed = script_parser::parse(
                std::slice::from_ref(utterance),
                &self.slot_types,
                &self.phrase_equivalents,
                &mut warnings,
            );
            let registration = IntentRegistration {
                utterances: parsed.utterances,
                slots: parsed.slots,
            };
            let name = format!("global_{}", Self::slug(utterance));
            let candidates = Arc::new(sharing);
            platform
                .reg_intent(&name, registration, Self::build_handler(name.clone(), candidates, shared.clone()))
                .await?;
        }

        for warning in warnings {
            tracing::warn!(%warning, "compile-time warning");
        }

        for (name, slot_type) in self.slot_types.iter() {
            if let SlotType::CustomEnum { values } = slot_type {
                platform.reg_custom_slot(name, values.clone()).await?;
            }
        }

        self.slot_types.freeze();

        let launch_phrases = self.launch_phrases.clone();
        let top_level_goals = self.top_level_goals.clone();
        let launch_shared = shared.clone();
        platform.on_launch(Arc::new(move |request| {
            let shared = launch_shared.clone();
            let launch_phrases = launch_phrases.clone();
            let top_level_goals = top_level_goals.clone();
            Box::pin(async move {
                let error_handler = Self::default_error_handler();
                dispatch_launch(request, &shared, &launch_phrases, &top_level_goals, &error_handler).await;
            })
        }));
        platform.on_error(Self::default_error_handler());

        self.compiled = true;
        Ok(())
    }
}
