//! The `ScriptParser` (spec §4.2): five stateless transforms applied
//! left-to-right to an author's raw utterance list, turning it into
//! platform-ready training data plus the slot→type map the adapter
//! needs at registration time.
//!
//! Determinism (spec §4.2): every step here is a pure function of its
//! input. Randomness is confined to `OutputManager`/`Response`, never to
//! this module.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use dialog_engine_core::{DispatchWarning, PhraseEquivalents, SlotType, SlotTypeRegistry};

/// The result of running the full pipeline: the expanded, platform-ready
/// utterance list and the slot name → platform type code map extracted
/// from it.
#[derive(Debug, Clone, Default)]
pub struct ParsedScript {
    pub utterances: Vec<String>,
    pub slots: HashMap<String, String>,
}

/// Step 1: strip `,` and `?` — trainers don't need punctuation.
fn strip_punctuation(utterances: &[String]) -> Vec<String> {
    utterances
        .iter()
        .map(|u| u.chars().filter(|c| *c != ',' && *c != '?').collect())
        .collect()
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

fn spell_below_hundred(n: u64) -> String {
    if n < 20 {
        ONES[n as usize].to_string()
    } else {
        let tens = TENS[(n / 10) as usize];
        let ones = n % 10;
        if ones == 0 {
            tens.to_string()
        } else {
            format!("{tens}-{}", ONES[ones as usize])
        }
    }
}

fn spell_below_thousand(n: u64) -> String {
    if n < 100 {
        spell_below_hundred(n)
    } else {
        let hundreds = n / 100;
        let rest = n % 100;
        if rest == 0 {
            format!("{} hundred", ONES[hundreds as usize])
        } else {
            format!("{} hundred {}", ONES[hundreds as usize], spell_below_hundred(rest))
        }
    }
}

/// Spells out a non-negative integer, grouped by the usual English
/// scale words. Falls back to digit-by-digit spelling for anything
/// wider than `u64` rather than panicking on overflow.
fn number_to_words(digits: &str) -> String {
    match digits.parse::<u64>() {
        Ok(0) => "zero".to_string(),
        Ok(mut n) => {
            const SCALES: [(u64, &str); 3] = [(1_000_000_000, "billion"), (1_000_000, "million"), (1_000, "thousand")];
            let mut parts = Vec::new();
            for (scale, word) in SCALES {
                if n >= scale {
                    parts.push(format!("{} {word}", spell_below_thousand(n / scale)));
                    n %= scale;
                }
            }
            if n > 0 || parts.is_empty() {
                parts.push(spell_below_thousand(n));
            }
            parts.join(" ")
        }
        Err(_) => digits
            .chars()
            .map(|c| ONES[c.to_digit(10).unwrap_or(0) as usize])
            .collect::<Vec<_>>()
            .join(" "),
    }
}

static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit-run regex is valid"));

/// Step 2: replace bare digit runs with their spoken-English
/// equivalents, so trainers receive words rather than digits.
fn spell_numbers(utterances: &[String]) -> Vec<String> {
    utterances
        .iter()
        .map(|u| DIGIT_RUN_RE.replace_all(u, |caps: &regex::Captures| number_to_words(&caps[0])).into_owned())
        .collect()
}

static SLOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([A-Za-z_][A-Za-z0-9_]*)\]\]").expect("slot regex is valid"));

fn sample_values_field(slot_type: Option<&SlotType>) -> String {
    match slot_type {
        Some(SlotType::FreeText { samples }) => samples.join("|"),
        Some(SlotType::BuiltIn { .. }) | Some(SlotType::CustomEnum { .. }) | None => "-".to_string(),
    }
}

/// Step 3: `[[name]]` → `{sampleVals|name}`. Unknown slot names default
/// to free-text and push a `DispatchWarning::UnknownSlotType`.
fn rewrite_slots(
    utterances: &[String],
    slot_types: &SlotTypeRegistry,
    warnings: &mut Vec<DispatchWarning>,
) -> Vec<String> {
    utterances
        .iter()
        .map(|u| {
            SLOT_RE
                .replace_all(u, |caps: &regex::Captures| {
                    let name = &caps[1];
                    if !slot_types.contains(name) {
                        warnings.push(DispatchWarning::UnknownSlotType {
                            slot_name: name.to_string(),
                        });
                    }
                    let samples = sample_values_field(slot_types.get(name));
                    format!("{{{samples}|{name}}}")
                })
                .into_owned()
        })
        .collect()
}

fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let lower_haystack = haystack.to_lowercase();
    let lower_needle = needle.to_lowercase();
    lower_haystack.find(&lower_needle)
}

/// Step 4: for each utterance, for each equivalent set, for each
/// matching phrase, emit additional utterances with each alternative
/// substituted at the matched position. One-pass: the newly generated
/// utterances are never themselves re-expanded (spec §4.2).
fn expand_phrase_equivalents(utterances: &[String], equivalents: &PhraseEquivalents) -> Vec<String> {
    let mut result = utterances.to_vec();
    for utterance in utterances {
        for set in equivalents.sets() {
            for phrase in set {
                let Some(pos) = find_case_insensitive(utterance, phrase) else {
                    continue;
                };
                for alt in set {
                    if alt == phrase {
                        continue;
                    }
                    let mut replaced = String::with_capacity(utterance.len());
                    replaced.push_str(&utterance[..pos]);
                    replaced.push_str(alt);
                    replaced.push_str(&utterance[pos + phrase.len()..]);
                    if !result.contains(&replaced) {
                        result.push(replaced);
                    }
                }
            }
        }
    }
    result
}

static EXTRACTED_SLOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|([A-Za-z_][A-Za-z0-9_]*)\}").expect("extraction regex is valid"));

/// Step 5: scan the produced utterances for `|name}` segments and
/// resolve each name to its platform type code.
fn extract_slots(utterances: &[String], slot_types: &SlotTypeRegistry) -> HashMap<String, String> {
    let mut slots = HashMap::new();
    for utterance in utterances {
        for caps in EXTRACTED_SLOT_RE.captures_iter(utterance) {
            let name = caps[1].to_string();
            let platform_type = slot_types.resolve_platform_type(&name);
            slots.insert(name, platform_type);
        }
    }
    slots
}

/// Runs the full five-step pipeline over one def's `expecting` list.
pub fn parse(
    utterances: &[String],
    slot_types: &SlotTypeRegistry,
    equivalents: &PhraseEquivalents,
    warnings: &mut Vec<DispatchWarning>,
) -> ParsedScript {
    let stripped = strip_punctuation(utterances);
    let spelled = spell_numbers(&stripped);
    let rewritten = rewrite_slots(&spelled, slot_types, warnings);
    let expanded = expand_phrase_equivalents(&rewritten, equivalents);
    let slots = extract_slots(&expanded, slot_types);
    ParsedScript {
        utterances: expanded,
        slots,
    }
}
