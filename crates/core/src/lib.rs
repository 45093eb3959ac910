//! Core traits and data model for the dialog conversation engine.
//!
//! This crate is the seam between the engine proper
//! (`dialog-engine-runtime`) and everything it must stay ignorant of: the
//! concrete voice platform, the persistent-record backend, and the
//! author's own goal/intent callbacks. It defines:
//! - the data model an author's script compiles down to (`SlotType`,
//!   `PhraseEquivalents`, the utterance template grammar, `IntentDef`,
//!   `GoalDef`, `GoalFrame`);
//! - the trait seams a resolver, a platform adapter, or a persistent
//!   store backend must satisfy (`Responder`, `PlatformRequest`,
//!   `PlatformAdapter`, `PersistentStore`);
//! - the error taxonomy shared by every other crate in this workspace.

pub mod error;
pub mod goal;
pub mod intent;
pub mod phrase;
pub mod platform;
pub mod record;
pub mod response;
pub mod session;
pub mod slot;
pub mod template;

pub use error::{DispatchWarning, RegistrationError, ResolverError, StoreError};
pub use goal::{GoalDef, GoalFrame, SpokenPhrases};
pub use intent::{IntentDef, ResolverFn};
pub use phrase::{PhraseEquivalentSet, PhraseEquivalents};
pub use platform::{
    ErrorHandler, IntentHandler, IntentRegistration, LaunchHandler, PlatformAdapter,
    PlatformRequest,
};
pub use record::{PersistentStore, RecordInstance};
pub use response::{ResolveOutcome, Responder};
pub use session::{InMemorySession, Session, GOAL_STATE_SESSION_KEY};
pub use slot::{SlotType, SlotTypeRegistry};
pub use template::{parse_template, slot_names, TemplateToken};
