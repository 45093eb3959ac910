//! Phrase-equivalent sets (spec §3, "PhraseEquivalentSet").
//!
//! A set of strings the `ScriptParser` treats as interchangeable when
//! expanding training utterances. Matching is case-insensitive, so sets
//! are stored lowercased; expansion order follows declaration order.

/// One set of mutually interchangeable phrases.
pub type PhraseEquivalentSet = Vec<String>;

/// An ordered collection of phrase-equivalent sets.
#[derive(Debug, Default, Clone)]
pub struct PhraseEquivalents(Vec<PhraseEquivalentSet>);

impl PhraseEquivalents {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends lowercased equivalence sets, preserving declaration order.
    pub fn extend(&mut self, sets: impl IntoIterator<Item = PhraseEquivalentSet>) {
        self.0.extend(
            sets.into_iter()
                .map(|set| set.into_iter().map(|s| s.to_lowercase()).collect()),
        );
    }

    pub fn sets(&self) -> &[PhraseEquivalentSet] {
        &self.0
    }
}
