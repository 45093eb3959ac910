//! Error taxonomy for the dialog engine (spec §7).
//!
//! Three families, three different propagation policies:
//! - [`RegistrationError`] is fatal and can only come out of
//!   `ConversationEngine::register_intents` — an author bug caught before
//!   the engine ever serves a turn.
//! - [`DispatchWarning`] is never fatal. It is logged via `tracing` at the
//!   point it occurs and also pushed onto the `Response` so tests can
//!   assert on it without scraping log output.
//! - [`ResolverError`] is whatever an author's resolver produced; it is
//!   caught at the goal-loop boundary and routed to the platform's error
//!   hook.

use thiserror::Error;

/// Author bugs caught at registration time (spec §7, "RegistrationError").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("goal `{0}` is already registered")]
    DuplicateGoalKey(String),

    #[error("goal `{0}` declares both a resolver and a prompt/ask — exactly one shape is valid")]
    ConflictingGoalShape(String),

    #[error("goal `{0}` declares neither a resolver nor a prompt/ask")]
    EmptyGoalShape(String),

    #[error("slot type `{0}` is a custom enum with no registered values")]
    UnresolvedSlotType(String),

    #[error("intent `{0}` is already registered")]
    DuplicateIntentName(String),
}

/// Raised when an author resolver rejects or throws (spec §7, "ResolverFailure").
#[derive(Debug, Error)]
#[error("resolver failed: {message}")]
pub struct ResolverError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn from_source(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

/// A recoverable condition logged during dispatch (spec §7, "DispatchWarning").
///
/// The turn always continues after one of these; they exist purely so the
/// goal loop can degrade gracefully instead of panicking on author or
/// platform mistakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchWarning {
    /// No `IntentDef` matched the current goal-stack context; the engine
    /// fell back to the first registered definition for the intent.
    UnknownIntent {
        intent_name: String,
        fell_back_to: Option<String>,
    },
    /// A slot referenced in an utterance template has no registered
    /// `SlotType`; the engine defaults it to free-text.
    UnknownSlotType { slot_name: String },
    /// A frame on the goal stack references a key with no matching
    /// `GoalDef`; the goal loop logs this and halts for the turn.
    UnknownGoalFrame { key: String },
}

impl std::fmt::Display for DispatchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchWarning::UnknownIntent {
                intent_name,
                fell_back_to,
            } => match fell_back_to {
                Some(def) => write!(
                    f,
                    "no goal-scoped definition matched intent `{intent_name}`; fell back to `{def}`"
                ),
                None => write!(f, "intent `{intent_name}` has no registered definitions"),
            },
            DispatchWarning::UnknownSlotType { slot_name } => write!(
                f,
                "slot `{slot_name}` has no registered type; defaulting to free-text"
            ),
            DispatchWarning::UnknownGoalFrame { key } => {
                write!(f, "goal stack references unregistered goal `{key}`")
            }
        }
    }
}

/// Errors surfaced by a `PersistentStore` backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("persistent store backend error: {0}")]
    Backend(String),
    #[error("record `{0}` not found")]
    NotFound(String),
}
