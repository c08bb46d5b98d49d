//! Qualsim Core — competitors, rating model, event simulators, allocation.
//!
//! This crate holds the sequential qualification engine:
//! - Domain types (competitors, pool, per-season roster, qualified set)
//! - Elo rating model with a rating-gap dependent draw rate
//! - Participation resolver (who plays, who may take a spot)
//! - Event simulators: knockout, Swiss, multi-event circuit, rating list
//! - Allocation strategies: strict top-N, spillover, circuit bonus, rating fill
//! - Deterministic RNG hierarchy for per-season streams
//!
//! Everything here is synchronous and free of I/O. Season orchestration and
//! the Monte Carlo harness live in `qualsim-runner`.

pub mod allocation;
pub mod domain;
pub mod event;
pub mod participation;
pub mod rating;
pub mod rng;
