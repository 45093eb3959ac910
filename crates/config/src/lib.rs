//! Ambient runtime settings for the dialog conversation engine.
//!
//! Mirrors the settings-loading shape the teacher workspace uses for its
//! `Settings` struct: a `config`-crate builder layering a TOML file under
//! environment-variable overrides, deserialized into a typed struct via
//! `serde`. Nothing here is author-script content (slot types, goals,
//! intents are the author's job, not the engine's) — this is purely the
//! handful of knobs the spec pins numeric defaults for (§4.4).

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Runtime environment, used only to decide how strict startup
/// validation should be — the engine behaves identically in all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// The engine's tunable constants (spec §4.4 pins the defaults below).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub environment: RuntimeEnvironment,

    /// Pause, in milliseconds, an SSML `<break>` inserts between
    /// sequential `say()` fragments (unless `quick` is set) and before
    /// the first `ask`/`prompt` fragment.
    pub pause_ms: u32,

    /// How much a single `prompt()` contributes to `asked` — three
    /// prompts should collapse into roughly one question.
    pub prompt_weight: f32,

    /// How much a single `ask()` contributes to `asked`.
    pub ask_weight: f32,

    /// Optional SSML `<prosody rate="...">` wrapper applied to the whole
    /// composed response. `None` means no prosody wrapper.
    pub spoken_rate: Option<String>,

    /// Fixes the RNG seed `OutputManager`'s phrase-picking uses (launch
    /// phrase selection, `say`/`prompt`/`ask` list picking) so a test or
    /// staging deployment gets reproducible output. `None` seeds from
    /// entropy, the production default.
    pub launch_phrase_selection_seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            environment: RuntimeEnvironment::default(),
            pause_ms: 500,
            prompt_weight: 0.34,
            ask_weight: 1.0,
            spoken_rate: None,
            launch_phrase_selection_seed: None,
        }
    }
}

impl EngineSettings {
    /// Layers an optional TOML file under `DIALOG_ENGINE_`-prefixed
    /// environment variables, the same layering
    /// `voice-agent-config::Settings::load` performs.
    pub fn load(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&EngineSettings::default())?);
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(Environment::with_prefix("DIALOG_ENGINE").separator("__"));
        builder.build()?.try_deserialize()
    }
}
