//! Goals (spec §3, "GoalDef" / "GoalFrame").
//!
//! A `GoalDef` is exactly one of two shapes: a resolver goal (runs logic,
//! never speaks on its own) or a query goal (elicits a slot via
//! `prompt`/`ask`, optionally with nested `respond_to` intents that get
//! desugared into top-level `IntentDef`s scoped to this goal's key).

use serde::{Deserialize, Serialize};

use crate::intent::IntentDef;

/// `say`/`prompt`/`ask` all accept either one phrase or a list to pick
/// from uniformly at random (spec §4.4, "`_pickAndInterpolate`").
#[derive(Debug, Clone)]
pub enum SpokenPhrases {
    One(String),
    Many(Vec<String>),
}

impl SpokenPhrases {
    pub fn as_slice(&self) -> &[String] {
        match self {
            SpokenPhrases::One(s) => std::slice::from_ref(s),
            SpokenPhrases::Many(v) => v,
        }
    }
}

impl From<&str> for SpokenPhrases {
    fn from(s: &str) -> Self {
        SpokenPhrases::One(s.to_string())
    }
}

impl From<String> for SpokenPhrases {
    fn from(s: String) -> Self {
        SpokenPhrases::One(s)
    }
}

impl From<Vec<String>> for SpokenPhrases {
    fn from(v: Vec<String>) -> Self {
        SpokenPhrases::Many(v)
    }
}

/// An author-declared goal (spec §3, "GoalDef").
///
/// Exactly one shape is valid: a resolver runs logic and is removed from
/// the stack on success; a query elicits a slot and is marked `queried`
/// once its prompt/ask has been spoken.
#[derive(Clone)]
pub enum GoalDef {
    Resolver {
        key: String,
        resolve: crate::intent::ResolverFn,
    },
    Query {
        key: String,
        prompt: Option<SpokenPhrases>,
        ask: Option<SpokenPhrases>,
        /// Desugared into top-level `IntentDef`s with `goal = Some(key)`
        /// at registration time (spec §4.7).
        respond_to: Vec<IntentDef>,
    },
}

impl GoalDef {
    pub fn key(&self) -> &str {
        match self {
            GoalDef::Resolver { key, .. } => key,
            GoalDef::Query { key, .. } => key,
        }
    }

    pub fn is_resolver(&self) -> bool {
        matches!(self, GoalDef::Resolver { .. })
    }
}

impl std::fmt::Debug for GoalDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalDef::Resolver { key, .. } => {
                f.debug_struct("GoalDef::Resolver").field("key", key).finish()
            }
            GoalDef::Query {
                key,
                prompt,
                ask,
                respond_to,
            } => f
                .debug_struct("GoalDef::Query")
                .field("key", key)
                .field("has_prompt", &prompt.is_some())
                .field("has_ask", &ask.is_some())
                .field("respond_to_count", &respond_to.len())
                .finish(),
        }
    }
}

/// A live instance of a goal on the stack (spec §3, "GoalFrame").
///
/// `queried` becomes `true` once a prompt/ask has been spoken for this
/// frame; resolver-goal frames never set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalFrame {
    pub key: String,
    #[serde(default)]
    pub queried: bool,
}

impl GoalFrame {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            queried: false,
        }
    }
}
