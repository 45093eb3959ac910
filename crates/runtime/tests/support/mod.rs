//! An in-memory `PlatformAdapter`/`PlatformRequest` test double.
//!
//! Exists purely to drive the engine end-to-end in tests; per spec §1
//! a concrete voice-platform adapter is out of scope for this crate,
//! so this double is never shipped (`tests/support/mod.rs`, mirroring
//! `voice-agent-agent/tests/voice_pipeline_integration.rs`'s support
//! module).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dialog_engine_core::{
    ErrorHandler, IntentHandler, IntentRegistration, InMemorySession, LaunchHandler,
    PlatformAdapter, PlatformRequest, RegistrationError, Session,
};

/// One inbound turn, built by the test and handed to a registered
/// handler.
pub struct TestRequest {
    pub user_id: String,
    pub slots: HashMap<String, String>,
    pub session: InMemorySession,
    pub transcript: Option<String>,
    pub should_end_session: bool,
}

impl TestRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            slots: HashMap::new(),
            session: InMemorySession::new(),
            transcript: None,
            should_end_session: false,
        }
    }

    pub fn with_session(mut self, session: InMemorySession) -> Self {
        self.session = session;
        self
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(name.into(), value.into());
        self
    }
}

impl PlatformRequest for TestRequest {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn slots(&self) -> &HashMap<String, String> {
        &self.slots
    }

    fn session(&self) -> &dyn Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut dyn Session {
        &mut self.session
    }

    fn say(&mut self, ssml: String) {
        self.transcript = Some(ssml);
    }

    fn set_should_end_session(&mut self, end: bool) {
        self.should_end_session = end;
    }
}

struct RegisteredIntent {
    registration: IntentRegistration,
    handler: IntentHandler,
}

/// Records every registration `ConversationEngine::register_intents`
/// makes, keyed by the platform intent name it chose.
#[derive(Default)]
pub struct TestAdapter {
    intents: HashMap<String, RegisteredIntent>,
    pub custom_slots: HashMap<String, Vec<String>>,
    launch: Option<LaunchHandler>,
    error: Option<ErrorHandler>,
}

impl TestAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intent_names(&self) -> Vec<String> {
        self.intents.keys().cloned().collect()
    }

    pub fn utterances_for(&self, name: &str) -> &[String] {
        &self.intents[name].registration.utterances
    }

    /// Invokes the handler registered under `name` against `request`.
    pub async fn send(&self, name: &str, request: &mut TestRequest) {
        let handler = self.intents[name].handler.clone();
        handler(request).await;
    }

    pub async fn launch(&self, request: &mut TestRequest) {
        let handler = self.launch.clone().expect("no launch handler registered");
        handler(request).await;
    }
}

#[async_trait]
impl PlatformAdapter for TestAdapter {
    async fn reg_intent(
        &mut self,
        name: &str,
        registration: IntentRegistration,
        handler: IntentHandler,
    ) -> Result<(), RegistrationError> {
        self.intents.insert(name.to_string(), RegisteredIntent { registration, handler });
        Ok(())
    }

    async fn reg_custom_slot(&mut self, type_name: &str, values: Vec<String>) -> Result<(), RegistrationError> {
        self.custom_slots.insert(type_name.to_string(), values);
        Ok(())
    }

    fn on_launch(&mut self, handler: LaunchHandler) {
        self.launch = Some(handler);
    }

    fn on_error(&mut self, handler: ErrorHandler) {
        self.error = Some(handler);
    }
}

/// A deterministic test double needs `Arc<Mutex<...>>` only when a
/// resolver closure must mutate shared state beyond `Responder`
/// itself (e.g. a call counter); most scenarios don't need this.
pub fn shared<T>(value: T) -> Arc<Mutex<T>> {
    Arc::new(Mutex::new(value))
}
