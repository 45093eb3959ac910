//! `OutputManager` (spec §4.4): accumulates `say`/`prompt`/`ask`
//! fragments for one turn and composes them into a single spoken SSML
//! response with pauses, prosody, and the "keep session open" flag.
//!
//! `_pickAndInterpolate` (picking a random phrase from a list, then
//! substituting `{{var}}` references) needs access to the session/
//! record state that only `Response` holds, so it lives here as a pair
//! of free functions `Response` calls before handing plain, already-
//! resolved text down to this module — `OutputManager` itself never
//! looks at session state.

use dialog_engine_config::EngineSettings;
use dialog_engine_core::{PlatformRequest, SpokenPhrases};
use rand::RngCore;

/// Picks a phrase uniformly at random when given a list (spec §9,
/// "Randomness" — tests inject a deterministic `RngCore`).
pub fn pick<'a>(phrases: &'a SpokenPhrases, rng: &mut dyn RngCore) -> &'a str {
    let slice = phrases.as_slice();
    match slice.len() {
        0 => "",
        1 => &slice[0],
        n => {
            use rand::Rng;
            let idx = rng.gen_range(0..n);
            &slice[idx]
        }
    }
}

/// Substitutes every `{{var}}` reference in `text` using `resolve`.
/// Unresolvable variables are left as-is rather than silently dropped,
/// so an author notices a typo'd reference in the spoken output.
pub fn interpolate(text: &str, resolve: &mut dyn FnMut(&str) -> Option<String>) -> String {
    use dialog_engine_core::TemplateToken;
    dialog_engine_core::parse_template(text)
        .into_iter()
        .map(|token| match token {
            TemplateToken::Literal(lit) => lit,
            TemplateToken::OutputVar(name) => resolve(&name).unwrap_or_else(|| format!("{{{{{name}}}}}")),
            TemplateToken::Slot(name) => format!("[[{name}]]"),
            TemplateToken::Optional(alts) => alts.into_iter().next().unwrap_or_default(),
        })
        .collect()
}

/// `pick` then `interpolate` in one call — the full `_pickAndInterpolate`.
pub fn pick_and_interpolate(
    phrases: &SpokenPhrases,
    rng: &mut dyn RngCore,
    resolve: &mut dyn FnMut(&str) -> Option<String>,
) -> String {
    let chosen = pick(phrases, rng).to_string();
    interpolate(&chosen, resolve)
}

#[derive(Debug, Clone)]
struct SayFragment {
    text: String,
    quick: bool,
}

/// Accumulates one turn's spoken output (spec §4.4).
pub struct OutputManager {
    say_fragments: Vec<SayFragment>,
    ask_fragments: Vec<String>,
    asked: f32,
    pause_ms: u32,
    prompt_weight: f32,
    ask_weight: f32,
    spoken_rate: Option<String>,
    close_requested: bool,
}

impl OutputManager {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            say_fragments: Vec::new(),
            ask_fragments: Vec::new(),
            asked: 0.0,
            pause_ms: settings.pause_ms,
            prompt_weight: settings.prompt_weight,
            ask_weight: settings.ask_weight,
            spoken_rate: settings.spoken_rate.clone(),
            close_requested: false,
        }
    }

    /// Queues a statement. Sequential `say`s join with a pause unless
    /// this one sets `quick`.
    pub fn say(&mut self, text: String, quick: bool) {
        if text.is_empty() {
            return;
        }
        self.say_fragments.push(SayFragment { text, quick });
    }

    /// Queues a question fragment; contributes `prompt_weight` to `asked`.
    pub fn prompt(&mut self, text: String) {
        if !text.is_empty() {
            self.ask_fragments.push(text);
        }
        self.asked += self.prompt_weight;
    }

    /// Queues a question fragment; contributes `ask_weight` to `asked`.
    pub fn ask(&mut self, text: String) {
        if !text.is_empty() {
            self.ask_fragments.push(text);
        }
        self.asked += self.ask_weight;
    }

    pub fn asked(&self) -> f32 {
        self.asked
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    fn pause(&self) -> String {
        format!("<break time=\"{}ms\"/>", self.pause_ms)
    }

    fn compose_say(&self) -> String {
        let mut out = String::new();
        for (i, fragment) in self.say_fragments.iter().enumerate() {
            if i > 0 {
                out.push(' ');
                if !fragment.quick {
                    out.push_str(&self.pause());
                    out.push(' ');
                }
            }
            out.push_str(&fragment.text);
        }
        out
    }

    fn compose_ask(&self) -> String {
        if self.ask_fragments.is_empty() {
            return String::new();
        }
        let mut out = format!("{} ", self.pause());
        match self.ask_fragments.len() {
            1 => out.push_str(&self.ask_fragments[0]),
            n => {
                out.push_str(&self.ask_fragments[..n - 1].join(", "));
                out.push_str(" or ");
                out.push_str(&self.ask_fragments[n - 1]);
            }
        }
        out
    }

    /// Composes the full turn's spoken output (spec §4.4, "Composition
    /// on flush"). An empty composition is valid — no speech, but the
    /// turn still closes cleanly.
    pub fn compose(&self) -> String {
        let say_part = self.compose_say();
        let ask_part = self.compose_ask();
        let mut composed = match (say_part.is_empty(), ask_part.is_empty()) {
            (true, true) => String::new(),
            (false, true) => say_part,
            (true, false) => ask_part,
            (false, false) => format!("{say_part} {ask_part}"),
        };
        if let Some(rate) = &self.spoken_rate {
            composed = format!("<prosody rate=\"{rate}\">{composed}</prosody>");
        }
        composed.replace(" & ", " and ")
    }

    pub fn should_end_session(&self) -> bool {
        self.close_requested
    }

    /// Hands the composed response to the platform and sets "keep
    /// session open" per the author's `request_close` calls this turn.
    pub fn flush(&self, request: &mut dyn PlatformRequest) {
        let composed = self.compose();
        if !composed.is_empty() {
            request.say(composed);
        }
        request.set_should_end_session(self.close_requested);
    }
}
