//! The ShortJSON codec (spec §4.1).
//!
//! Encodes a goal stack — a list of `GoalFrame`s — into one compact
//! string so it fits in a single platform session slot. Two delimiters:
//! `;` separates frames, `:` separates a frame's key from its `true`
//! flags (`key:flagA:flagB`; absent flags are false). Frames are stored
//! with index 0 as the stack top, so the leftmost occurrence of a key in
//! the string is always its innermost (most recently pushed) one — which
//! makes `remove`'s "leftmost run" rule (spec §8, item 2) and
//! `GoalStack::remove`'s "innermost frame" rule (spec §3) the same
//! operation.

use regex::Regex;

use dialog_engine_core::GoalFrame;

/// One frame reduced to its flag alphabet: the key plus every `true`
/// flag it carries, in the fixed order they're emitted.
type FlagFrame = (String, Vec<String>);

fn frame_to_flags(frame: &GoalFrame) -> FlagFrame {
    let mut flags = Vec::new();
    if frame.queried {
        flags.push("queried".to_string());
    }
    (frame.key.clone(), flags)
}

fn flags_to_frame(key: String, flags: Vec<String>) -> GoalFrame {
    GoalFrame {
        key,
        queried: flags.iter().any(|f| f == "queried"),
    }
}

/// `arrObjToArr`: goal frames (objects) to flag-tuples.
pub fn arr_obj_to_arr(frames: &[GoalFrame]) -> Vec<FlagFrame> {
    frames.iter().map(frame_to_flags).collect()
}

/// `arrToArrObj`: flag-tuples back to goal frames.
pub fn arr_to_arr_obj(flag_frames: Vec<FlagFrame>) -> Vec<GoalFrame> {
    flag_frames
        .into_iter()
        .map(|(key, flags)| flags_to_frame(key, flags))
        .collect()
}

fn encode_one(key: &str, flags: &[String]) -> String {
    if flags.is_empty() {
        key.to_string()
    } else {
        format!("{key}:{}", flags.join(":"))
    }
}

/// `arrToSJN`: flag-tuples to the `;`-joined wire string.
pub fn arr_to_sjn(flag_frames: &[FlagFrame]) -> String {
    flag_frames
        .iter()
        .map(|(key, flags)| encode_one(key, flags))
        .collect::<Vec<_>>()
        .join(";")
}

/// `sjnToArr`: the wire string back to flag-tuples. Empty input decodes
/// to the empty list.
pub fn sjn_to_arr(sjn: &str) -> Vec<FlagFrame> {
    if sjn.is_empty() {
        return Vec::new();
    }
    sjn.split(';')
        .map(|frame| {
            let mut parts = frame.split(':');
            let key = parts.next().unwrap_or("").to_string();
            let flags = parts.map(|s| s.to_string()).collect();
            (key, flags)
        })
        .collect()
}

/// Encodes a full frame list in one pass.
pub fn encode(frames: &[GoalFrame]) -> String {
    arr_to_sjn(&arr_obj_to_arr(frames))
}

/// Decodes a full frame list in one pass.
pub fn decode(sjn: &str) -> Vec<GoalFrame> {
    arr_to_arr_obj(sjn_to_arr(sjn))
}

/// Appends a frame to the front — the new frame becomes the stack top,
/// matching `GoalStack::append`'s "top is most-recently-added" rule.
pub fn push(sjn: &str, frame: &GoalFrame) -> String {
    let (key, flags) = frame_to_flags(frame);
    let new_frame = encode_one(&key, &flags);
    if sjn.is_empty() {
        new_frame
    } else {
        format!("{new_frame};{sjn}")
    }
}

fn word_boundary_re(key: &str) -> Regex {
    Regex::new(&format!(r"\b{}\b", regex::escape(key))).expect("word-boundary pattern is valid")
}

/// `contains(key)`: regex `\bkey\b` over the whole wire string (spec
/// §4.1). Note this also matches a key that only appears as a flag name
/// — a known wart inherited from the source encoding, since keys and
/// flags share the same `[a-z]*` alphabet.
pub fn contains(sjn: &str, key: &str) -> bool {
    word_boundary_re(key).is_match(sjn)
}

/// `remove(key)`: removes the first (leftmost) `key(:flag)*` run and
/// collapses the now-adjacent `;` separators.
pub fn remove(sjn: &str, key: &str) -> String {
    if sjn.is_empty() {
        return String::new();
    }
    let frames: Vec<&str> = sjn.split(';').collect();
    match frames.iter().position(|frame| frame.split(':').next() == Some(key)) {
        Some(idx) => {
            let mut remaining = frames;
            remaining.remove(idx);
            remaining.join(";")
        }
        None => sjn.to_string(),
    }
}
