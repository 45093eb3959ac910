//! The platform-adapter boundary (spec §6, "Platform adapter contract").
//!
//! The engine depends only on these traits. A concrete adapter — how a
//! webhook body is parsed, how audio is returned — is deliberately out of
//! scope (spec §1); these traits exist purely so `ConversationEngine` and
//! `PlatformRegistry` can be exercised against an in-memory test double.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::{RegistrationError, ResolverError};
use crate::session::Session;

/// One inbound webhook turn, abstracted away from any concrete platform
/// wire format.
pub trait PlatformRequest: Send + Sync {
    fn user_id(&self) -> &str;
    fn slots(&self) -> &HashMap<String, String>;
    fn slot(&self, name: &str) -> Option<&str> {
        self.slots().get(name).map(|s| s.as_str())
    }
    fn session(&self) -> &dyn Session;
    fn session_mut(&mut self) -> &mut dyn Session;
    /// Hand the composed SSML response to the platform.
    fn say(&mut self, ssml: String);
    /// "keep session open" unless the author requested close.
    fn set_should_end_session(&mut self, end: bool);
}

/// What `ConversationEngine::register_intents` hands a
/// `PlatformAdapter::reg_intent` call: the compiled training utterances
/// plus the resolved slot→platform-type-code map (spec §4.7, "Compile step").
#[derive(Debug, Clone, Default)]
pub struct IntentRegistration {
    pub utterances: Vec<String>,
    pub slots: HashMap<String, String>,
}

/// Invoked by the adapter once it has matched an intent; the engine
/// supplies this closure and owns everything it does (building the
/// `Response`, running the goal loop, flushing `OutputManager`).
pub type IntentHandler =
    Arc<dyn for<'a> Fn(&'a mut dyn PlatformRequest) -> BoxFuture<'a, ()> + Send + Sync>;

/// Invoked by the adapter when its platform starts a session with no
/// matched intent.
pub type LaunchHandler =
    Arc<dyn for<'a> Fn(&'a mut dyn PlatformRequest) -> BoxFuture<'a, ()> + Send + Sync>;

/// Invoked when a resolver fails; composes the generic apology and
/// flushes, per spec §7's "always produce some spoken output" rule.
pub type ErrorHandler = Arc<
    dyn for<'a> Fn(&'a mut dyn PlatformRequest, &'a ResolverError) -> BoxFuture<'a, ()>
        + Send
        + Sync,
>;

/// A single voice-platform adapter (spec §6).
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    async fn reg_intent(
        &mut self,
        name: &str,
        registration: IntentRegistration,
        handler: IntentHandler,
    ) -> Result<(), RegistrationError>;

    async fn reg_custom_slot(
        &mut self,
        type_name: &str,
        values: Vec<String>,
    ) -> Result<(), RegistrationError>;

    fn on_launch(&mut self, handler: LaunchHandler);

    fn on_error(&mut self, handler: ErrorHandler);
}
