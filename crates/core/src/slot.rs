//! Slot types (spec §3, "SlotType").
//!
//! A `SlotType` is a named type for parameters the platform extracts from
//! user speech. Keys are unique; the registry is frozen after
//! `ConversationEngine::register_intents` — see §9, "Global mutable
//! registration tables."

use std::collections::HashMap;

use crate::error::RegistrationError;

/// A registered slot type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotType {
    /// Mapped by the platform adapter to one of its native types. The
    /// string is the adapter-specific type code the author supplies
    /// (e.g. an `AMAZON.NUMBER`-shaped identifier).
    BuiltIn { platform_type: String },
    /// A finite set of values, registered with every platform adapter via
    /// `PlatformAdapter::reg_custom_slot`.
    CustomEnum { values: Vec<String> },
    /// Free text, with sample values used purely for trainer data — the
    /// platform does not constrain the match.
    FreeText { samples: Vec<String> },
}

impl SlotType {
    pub fn built_in(platform_type: impl Into<String>) -> Self {
        SlotType::BuiltIn {
            platform_type: platform_type.into(),
        }
    }

    pub fn custom_enum(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SlotType::CustomEnum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn free_text(samples: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SlotType::FreeText {
            samples: samples.into_iter().map(Into::into).collect(),
        }
    }
}

/// Registry of author-declared slot types.
///
/// Registration (`insert`) is idempotent per key: the last write before
/// `freeze()` wins. Any mutation attempted after `freeze()` panics, the
/// same post-compile-immutability rule the engine applies to its compiled
/// intent table.
#[derive(Debug, Default)]
pub struct SlotTypeRegistry {
    types: HashMap<String, SlotType>,
    frozen: bool,
}

impl SlotTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent per key — last write wins.
    pub fn insert(&mut self, name: impl Into<String>, slot_type: SlotType) {
        let name = name.into();
        assert!(
            !self.frozen,
            "cannot register slot type `{name}` after the engine has been compiled"
        );
        self.types.insert(name, slot_type);
    }

    pub fn get(&self, name: &str) -> Option<&SlotType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SlotType)> {
        self.types.iter()
    }

    /// Validates the registry before freezing it: every custom-enum slot
    /// type must have at least one registered value.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        for (name, slot_type) in &self.types {
            if let SlotType::CustomEnum { values } = slot_type {
                if values.is_empty() {
                    return Err(RegistrationError::UnresolvedSlotType(name.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The platform type code a `ScriptParser` slot-extraction pass should
    /// record for this slot name. Custom-enum and free-text types are
    /// registered with the adapter under their own name, so that name is
    /// the type code; built-in types carry their own platform type code.
    /// Unknown names default to free-text (a `DispatchWarning` is the
    /// caller's responsibility to log).
    pub fn resolve_platform_type(&self, name: &str) -> String {
        match self.types.get(name) {
            Some(SlotType::BuiltIn { platform_type }) => platform_type.clone(),
            Some(SlotType::CustomEnum { .. }) | Some(SlotType::FreeText { .. }) | None => {
                name.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut registry = SlotTypeRegistry::new();
        registry.insert("airline", SlotType::free_text(["Delta"]));
        registry.insert("airline", SlotType::built_in("AMAZON.Airline"));
        assert_eq!(
            registry.get("airline"),
            Some(&SlotType::built_in("AMAZON.Airline"))
        );
    }

    #[test]
    fn empty_custom_enum_fails_validation() {
        let mut registry = SlotTypeRegistry::new();
        registry.insert("tier", SlotType::custom_enum(Vec::<String>::new()));
        assert_eq!(
            registry.validate(),
            Err(RegistrationError::UnresolvedSlotType("tier".to_string()))
        );
    }

    #[test]
    #[should_panic(expected = "after the engine has been compiled")]
    fn mutation_after_freeze_panics() {
        let mut registry = SlotTypeRegistry::new();
        registry.freeze();
        registry.insert("late", SlotType::built_in("AMAZON.NUMBER"));
    }
}
