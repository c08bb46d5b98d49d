//! Qualsim Runner — scenarios, season orchestration, Monte Carlo, statistics.
//!
//! This crate builds on `qualsim-core` to provide:
//! - TOML scenario files with validation before any season runs
//! - Event registry with the built-in formats and per-file overrides
//! - Season orchestrator (`Idle → Running(slot) → Complete`)
//! - Monte Carlo harness with deterministic per-season RNG streams
//! - Fairness statistics (means, spread, top-K hit rate, qualification odds)
//! - Competitor pool loading from JSON

pub mod config;
pub mod monte_carlo;
pub mod pool_loader;
pub mod registry;
pub mod season;
pub mod stats;

pub use config::{ConfigError, EventSlot, ScenarioConfig, ScenarioFile, SeasonConfig, SlotConfig};
pub use monte_carlo::{run_monte_carlo, run_monte_carlo_seasons, McError, MonteCarloConfig, MonteCarloRun};
pub use pool_loader::{load_pool, pool_from_json, LoadError};
pub use registry::EventRegistry;
pub use season::{run_season, QualifierRecord, Season, SeasonError, SeasonResult, SeasonState, SlotOutcome};
pub use stats::{FairnessAccumulator, MonteCarloSummary, QualificationOdds, ThresholdCount};
