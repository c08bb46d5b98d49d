//! Monte Carlo harness: repeat a season many times and aggregate fairness.
//!
//! Each season gets its own RNG stream, derived from the master seed, the
//! scenario name and the season index, so results do not depend on how many
//! worker threads run the seasons or in what order they finish.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use qualsim_core::domain::CompetitorPool;
use qualsim_core::rng::RngHierarchy;

use crate::config::SeasonConfig;
use crate::season::{run_season, Season, SeasonError, SeasonResult};
use crate::stats::{FairnessAccumulator, MonteCarloSummary};

// ─── Config ──────────────────────────────────────────────────────────

/// Harness parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub seasons: usize,
    pub master_seed: u64,
    /// Worker threads: 0 uses rayon's global pool, 1 runs sequentially.
    pub threads: usize,
    /// Baseline ratings for the below-threshold counts.
    pub thresholds: Vec<f64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            seasons: 1000,
            master_seed: 42,
            threads: 0,
            thresholds: vec![2700.0, 2650.0],
        }
    }
}

/// Errors from the harness.
#[derive(Debug, Error)]
pub enum McError {
    #[error("at least one season is required")]
    ZeroSeasons,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("season configuration rejected: {0}")]
    Invalid(#[source] SeasonError),

    #[error("season {index} failed: {source}")]
    Season {
        index: usize,
        #[source]
        source: SeasonError,
    },

    #[error("scenario '{0}': no season produced a qualifier")]
    NoValidSeasons(String),
}

// ─── Harness ─────────────────────────────────────────────────────────

/// Everything one Monte Carlo run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloRun {
    pub summary: MonteCarloSummary,
    /// Per-season results, indexed by season.
    pub seasons: Vec<SeasonResult>,
}

/// Run `mc.seasons` independent seasons of `config` over `pool` and return
/// the summary.
///
/// See [`run_monte_carlo_seasons`] to keep the per-season results.
pub fn run_monte_carlo(
    pool: &CompetitorPool,
    config: &SeasonConfig,
    mc: &MonteCarloConfig,
) -> Result<MonteCarloSummary, McError> {
    run_monte_carlo_seasons(pool, config, mc).map(|run| run.summary)
}

/// Run `mc.seasons` independent seasons and return the summary together
/// with every season's result.
///
/// Season results are collected in index order and reduced sequentially,
/// so both the seasons and the summary are identical for any thread count.
/// The first fatal season error stops the run.
pub fn run_monte_carlo_seasons(
    pool: &CompetitorPool,
    config: &SeasonConfig,
    mc: &MonteCarloConfig,
) -> Result<MonteCarloRun, McError> {
    if mc.seasons == 0 {
        return Err(McError::ZeroSeasons);
    }
    // Surface configuration problems once, before any season runs.
    Season::new(pool, config).map_err(McError::Invalid)?;

    info!(
        scenario = %config.name,
        seasons = mc.seasons,
        seed = mc.master_seed,
        threads = mc.threads,
        "monte carlo start"
    );

    let hierarchy = RngHierarchy::new(mc.master_seed);
    let run_one = |index: usize| -> Result<SeasonResult, McError> {
        let mut rng = hierarchy.season_rng(&config.name, index as u64);
        run_season(pool, config, &mut rng).map_err(|source| McError::Season { index, source })
    };

    let seasons: Vec<SeasonResult> = match mc.threads {
        1 => (0..mc.seasons).map(run_one).collect::<Result<_, _>>()?,
        0 => (0..mc.seasons).into_par_iter().map(run_one).collect::<Result<_, _>>()?,
        n => {
            let thread_pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            thread_pool.install(|| {
                (0..mc.seasons)
                    .into_par_iter()
                    .map(run_one)
                    .collect::<Result<Vec<_>, _>>()
            })?
        }
    };

    let mut acc = FairnessAccumulator::new(
        config.name.clone(),
        pool.top_by_baseline(config.target_candidates),
        &mc.thresholds,
    );
    for season in &seasons {
        acc.push(season);
    }

    let summary = acc
        .finish(pool)
        .ok_or_else(|| McError::NoValidSeasons(config.name.clone()))?;
    info!(
        scenario = %summary.scenario,
        valid = summary.valid_seasons,
        mean_baseline = summary.mean_baseline,
        hit_rate = summary.top_k_hit_rate,
        "monte carlo complete"
    );
    Ok(MonteCarloRun { summary, seasons })
}
