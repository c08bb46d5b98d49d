//! Scenario configuration.
//!
//! Scenario files are TOML. The raw, deserialized form ([`ScenarioConfig`])
//! keeps signed integers where a negative value is a user mistake worth
//! reporting; [`ScenarioConfig::validate`] turns it into a [`SeasonConfig`]
//! the orchestrator can run without further checks.
//!
//! ```toml
//! [monte_carlo]
//! seasons = 2000
//!
//! [events.short_swiss]
//! format = "swiss"
//! rounds = 9
//!
//! [[scenarios]]
//! name = "world cup first"
//! target_candidates = 8
//!
//! [[scenarios.slots]]
//! event = "world_cup"
//! max_spots = 2
//!
//! [[scenarios.slots]]
//! event = "rating"
//! max_spots = 6
//! strategy = { type = "rating", guaranteed_spots = 1 }
//!
//! [scenarios.directives.1503014]
//! mode = "plays_not_eligible"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use qualsim_core::allocation::AllocationStrategy;
use qualsim_core::domain::CompetitorId;
use qualsim_core::event::{EventFormat, FormatError};
use qualsim_core::participation::{ParticipationDirective, ParticipationResolver};
use qualsim_core::rating::RatingModel;

use crate::monte_carlo::MonteCarloConfig;
use crate::registry::EventRegistry;

// ─── Errors ──────────────────────────────────────────────────────────

/// Configuration failures. All of them are reported before any season runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scenario '{scenario}': target_candidates must be positive, got {value}")]
    NonPositiveTarget { scenario: String, value: i64 },

    #[error("scenario '{scenario}', slot {slot}: negative spot budget {value}")]
    NegativeSpots {
        scenario: String,
        slot: usize,
        value: i64,
    },

    #[error("scenario '{scenario}', slot {slot}: unknown event '{event}'")]
    UnknownEvent {
        scenario: String,
        slot: usize,
        event: String,
    },

    #[error("scenario '{scenario}': {what} = {value} is outside [0, 1]")]
    ProbabilityOutOfRange {
        scenario: String,
        what: String,
        value: f64,
    },

    #[error("scenario '{scenario}': invalid competitor id '{key}' in directives")]
    BadCompetitorId { scenario: String, key: String },

    #[error("scenario '{scenario}': invalid rating model: {reason}")]
    InvalidRatingModel { scenario: String, reason: String },

    #[error("event '{event}': {source}")]
    InvalidFormat {
        event: String,
        #[source]
        source: FormatError,
    },

    #[error("no scenarios defined")]
    NoScenarios,

    #[error("duplicate scenario name '{0}'")]
    DuplicateScenario(String),

    #[error("parse scenario TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ─── Raw (deserialized) config ───────────────────────────────────────

/// A scenario file: shared Monte Carlo settings, event overrides and one or
/// more scenarios.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
    /// Added to, or replacing, the built-in event registry.
    #[serde(default)]
    pub events: BTreeMap<String, EventFormat>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioConfig>,
}

impl ScenarioFile {
    /// Load a scenario file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a scenario file from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Built-in events merged with this file's overrides.
    pub fn registry(&self) -> EventRegistry {
        let mut registry = EventRegistry::builtin();
        for (id, format) in &self.events {
            registry.insert(id.clone(), format.clone());
        }
        registry
    }

    /// Validate every scenario. Stops at the first error.
    pub fn validate(&self) -> Result<Vec<SeasonConfig>, ConfigError> {
        if self.scenarios.is_empty() {
            return Err(ConfigError::NoScenarios);
        }
        let registry = self.registry();
        let mut seen = HashSet::new();
        self.scenarios
            .iter()
            .map(|scenario| {
                if !seen.insert(scenario.name.as_str()) {
                    return Err(ConfigError::DuplicateScenario(scenario.name.clone()));
                }
                scenario.validate(&registry)
            })
            .collect()
    }
}

/// One event slot as written in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Event id, resolved through the registry.
    pub event: String,
    pub max_spots: i64,
    #[serde(default)]
    pub strategy: AllocationStrategy,
    /// Chance that an already-qualified competitor sits this event out.
    #[serde(default)]
    pub qualified_skip_prob: f64,
    /// Truncate the event standing before allocation.
    #[serde(default)]
    pub standing_depth: Option<usize>,
}

impl SlotConfig {
    pub fn new(event: impl Into<String>, max_spots: i64, strategy: AllocationStrategy) -> Self {
        Self {
            event: event.into(),
            max_spots,
            strategy,
            qualified_skip_prob: 0.0,
            standing_depth: None,
        }
    }

    pub fn with_skip_prob(mut self, p: f64) -> Self {
        self.qualified_skip_prob = p;
        self
    }
}

/// One qualification scenario as written in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub target_candidates: i64,
    /// Slots in priority order.
    #[serde(default)]
    pub slots: Vec<SlotConfig>,
    /// Keyed by competitor id.
    #[serde(default)]
    pub directives: BTreeMap<String, ParticipationDirective>,
    #[serde(default)]
    pub rating_model: RatingModel,
}

impl ScenarioConfig {
    pub fn new(name: impl Into<String>, target_candidates: i64) -> Self {
        Self {
            name: name.into(),
            target_candidates,
            slots: Vec::new(),
            directives: BTreeMap::new(),
            rating_model: RatingModel::default(),
        }
    }

    pub fn with_slot(mut self, slot: SlotConfig) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn with_directive(mut self, id: u64, directive: ParticipationDirective) -> Self {
        self.directives.insert(id.to_string(), directive);
        self
    }

    /// Check every field and resolve event ids against `registry`.
    pub fn validate(&self, registry: &EventRegistry) -> Result<SeasonConfig, ConfigError> {
        let scenario = || self.name.clone();

        let target_candidates = usize::try_from(self.target_candidates)
            .ok()
            .filter(|&t| t > 0)
            .ok_or_else(|| ConfigError::NonPositiveTarget {
                scenario: scenario(),
                value: self.target_candidates,
            })?;

        check_rating_model(&self.rating_model).map_err(|reason| {
            ConfigError::InvalidRatingModel {
                scenario: scenario(),
                reason,
            }
        })?;

        let mut slots = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            let max_spots =
                usize::try_from(slot.max_spots).map_err(|_| ConfigError::NegativeSpots {
                    scenario: scenario(),
                    slot: index,
                    value: slot.max_spots,
                })?;
            let format = registry
                .get(&slot.event)
                .ok_or_else(|| ConfigError::UnknownEvent {
                    scenario: scenario(),
                    slot: index,
                    event: slot.event.clone(),
                })?;
            format.validate().map_err(|source| ConfigError::InvalidFormat {
                event: slot.event.clone(),
                source,
            })?;
            check_probability(
                &self.name,
                &format!("slot {index} qualified_skip_prob"),
                slot.qualified_skip_prob,
            )?;

            slots.push(EventSlot {
                event_id: slot.event.clone(),
                format: format.clone(),
                max_spots,
                strategy: slot.strategy,
                qualified_skip_prob: slot.qualified_skip_prob,
                standing_depth: slot.standing_depth,
            });
        }

        let mut directives = BTreeMap::new();
        for (key, directive) in &self.directives {
            let id = key
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::BadCompetitorId {
                    scenario: scenario(),
                    key: key.clone(),
                })?;
            if let Some(p) = directive.qualified_skip_prob {
                check_probability(&self.name, &format!("directive {id} qualified_skip_prob"), p)?;
            }
            directives.insert(CompetitorId(id), directive.clone());
        }

        Ok(SeasonConfig {
            name: self.name.clone(),
            target_candidates,
            slots,
            resolver: ParticipationResolver::new(directives),
            rating_model: self.rating_model,
        })
    }
}

fn check_probability(scenario: &str, what: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange {
            scenario: scenario.to_string(),
            what: what.to_string(),
            value,
        })
    }
}

fn check_rating_model(model: &RatingModel) -> Result<(), String> {
    if !model.k_factor.is_finite() || model.k_factor < 0.0 {
        return Err(format!("k_factor must be finite and non-negative, got {}", model.k_factor));
    }
    for (name, p) in [("draw_max", model.draw_max), ("draw_min", model.draw_min)] {
        if !(0.0..=1.0).contains(&p) {
            return Err(format!("{name} must lie in [0, 1], got {p}"));
        }
    }
    if model.draw_min > model.draw_max {
        return Err("draw_min exceeds draw_max".into());
    }
    if !model.draw_scale.is_finite() || model.draw_scale < 0.0 {
        return Err(format!("draw_scale must be finite and non-negative, got {}", model.draw_scale));
    }
    Ok(())
}

// ─── Validated config ────────────────────────────────────────────────

/// A validated event slot with its format resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSlot {
    pub event_id: String,
    pub format: EventFormat,
    pub max_spots: usize,
    pub strategy: AllocationStrategy,
    pub qualified_skip_prob: f64,
    pub standing_depth: Option<usize>,
}

/// A validated season configuration.
#[derive(Debug, Clone)]
pub struct SeasonConfig {
    pub name: String,
    pub target_candidates: usize,
    pub slots: Vec<EventSlot>,
    pub resolver: ParticipationResolver,
    pub rating_model: RatingModel,
}
