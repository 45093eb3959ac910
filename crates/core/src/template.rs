//! Utterance template grammar (spec §6):
//!
//! ```text
//! template := (literal | slot | optionalGroup)*
//! slot         := '[[' identifier ']]'
//! outputVar    := '{{' identifier '}}'      # only substituted at say/prompt time
//! optionalGroup:= '{' alt ('|' alt)* '}'    # empty alt allowed, means "omit"
//! ```
//!
//! `parse_template` is a pure tokenizer shared by `ScriptParser` (which
//! only cares about `Slot` tokens) and the output-composition path in
//! `dialog-engine-runtime`, which substitutes `OutputVar` tokens at
//! say/prompt time.

use once_cell::sync::Lazy;
use regex::Regex;

/// One token of a parsed utterance template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
    Literal(String),
    /// `[[name]]`
    Slot(String),
    /// `{{name}}`, substituted from session/record state at say-time.
    OutputVar(String),
    /// `{alt1|alt2|}` — an empty alternative means "may be omitted".
    Optional(Vec<String>),
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\[\[(?P<slot>[A-Za-z_][A-Za-z0-9_]*)\]\]|\{\{(?P<outvar>[A-Za-z_][A-Za-z0-9_]*)\}\}|\{(?P<opt>[^{}]*)\}",
    )
    .expect("static template token regex is valid")
});

/// Parses a raw author-written utterance template into tokens, left to
/// right. Pure function of the input — see spec §4.2, "Determinism."
pub fn parse_template(raw: &str) -> Vec<TemplateToken> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in TOKEN_RE.captures_iter(raw) {
        let whole = caps.get(0).expect("capture group 0 always matches");
        if whole.start() > last {
            tokens.push(TemplateToken::Literal(raw[last..whole.start()].to_string()));
        }
        if let Some(slot) = caps.name("slot") {
            tokens.push(TemplateToken::Slot(slot.as_str().to_string()));
        } else if let Some(outvar) = caps.name("outvar") {
            tokens.push(TemplateToken::OutputVar(outvar.as_str().to_string()));
        } else if let Some(opt) = caps.name("opt") {
            let alts = opt.as_str().split('|').map(|s| s.to_string()).collect();
            tokens.push(TemplateToken::Optional(alts));
        }
        last = whole.end();
    }
    if last < raw.len() {
        tokens.push(TemplateToken::Literal(raw[last..].to_string()));
    }
    tokens
}

/// Names of every `[[slot]]` reference in a raw template, in appearance
/// order, duplicates included.
pub fn slot_names(raw: &str) -> Vec<String> {
    parse_template(raw)
        .into_iter()
        .filter_map(|token| match token {
            TemplateToken::Slot(name) => Some(name),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_token_kinds() {
        let tokens = parse_template("Book a {{tone}} flight to [[destination]] {please|}");
        assert_eq!(
            tokens,
            vec![
                TemplateToken::Literal("Book a ".to_string()),
                TemplateToken::OutputVar("tone".to_string()),
                TemplateToken::Literal(" flight to ".to_string()),
                TemplateToken::Slot("destination".to_string()),
                TemplateToken::Literal(" ".to_string()),
                TemplateToken::Optional(vec!["please".to_string(), "".to_string()]),
            ]
        );
    }

    #[test]
    fn slot_names_in_appearance_order_with_duplicates() {
        let names = slot_names("from [[city]] to [[city]] via [[airline]]");
        assert_eq!(names, vec!["city", "city", "airline"]);
    }

    #[test]
    fn plain_literal_has_no_tokens_but_the_literal() {
        let tokens = parse_template("Hello there");
        assert_eq!(tokens, vec![TemplateToken::Literal("Hello there".to_string())]);
    }
}
