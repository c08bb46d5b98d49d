//! Named event formats.
//!
//! Slots refer to events by id. The registry maps each id to a concrete
//! [`EventFormat`]; scenario files may add ids or override the built-ins.

use std::collections::BTreeMap;

use qualsim_core::event::{CircuitConfig, EventFormat, KnockoutConfig, SwissConfig};

pub const WORLD_CUP: &str = "world_cup";
pub const GRAND_SWISS: &str = "grand_swiss";
pub const FIDE_CIRCUIT: &str = "fide_circuit";
pub const RATING: &str = "rating";

/// Event id → format lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRegistry {
    formats: BTreeMap<String, EventFormat>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EventRegistry {
    /// Registry with no entries.
    pub fn empty() -> Self {
        Self {
            formats: BTreeMap::new(),
        }
    }

    /// The four built-in events with default parameters.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.insert(WORLD_CUP, EventFormat::Knockout(KnockoutConfig::default()));
        registry.insert(GRAND_SWISS, EventFormat::Swiss(SwissConfig::default()));
        registry.insert(FIDE_CIRCUIT, EventFormat::Circuit(CircuitConfig::default()));
        registry.insert(RATING, EventFormat::RatingList);
        registry
    }

    /// Add or replace an entry, returning the previous format for `id`.
    pub fn insert(&mut self, id: impl Into<String>, format: EventFormat) -> Option<EventFormat> {
        self.formats.insert(id.into(), format)
    }

    pub fn get(&self, id: &str) -> Option<&EventFormat> {
        self.formats.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.formats.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EventFormat)> {
        self.formats.iter().map(|(id, f)| (id.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
