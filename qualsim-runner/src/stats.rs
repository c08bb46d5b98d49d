//! Fairness statistics over many seasons.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use qualsim_core::domain::{CompetitorId, CompetitorPool};

use crate::season::SeasonResult;

/// Qualifiers below one rating threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCount {
    pub threshold: f64,
    /// Qualifiers below the threshold, summed over valid seasons.
    pub total_below: usize,
    /// Average number below the threshold per valid season.
    pub mean_per_season: f64,
    /// Fraction of valid seasons with at least one qualifier below.
    pub season_rate: f64,
}

/// One competitor's estimated qualification probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualificationOdds {
    pub id: CompetitorId,
    pub name: String,
    pub baseline: f64,
    pub probability: f64,
}

/// Aggregated fairness statistics for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloSummary {
    pub scenario: String,
    pub total_seasons: usize,
    /// Seasons with a non-empty qualified set; the denominator of every mean.
    pub valid_seasons: usize,
    /// Mean over seasons of the qualifiers' average baseline rating.
    pub mean_baseline: f64,
    /// Mean over seasons of the qualifiers' average live rating.
    pub mean_live: f64,
    /// Population standard deviation of the per-season average live rating.
    pub std_live: f64,
    /// Fraction of seasons whose qualified set equals the baseline top-K.
    pub top_k_hit_rate: f64,
    /// Mean qualification probability of the baseline top-K.
    pub top_k_coverage: f64,
    pub thresholds: Vec<ThresholdCount>,
    /// Lowest baseline rating among all qualifiers of all seasons.
    pub min_qualifier_rating: f64,
    /// Sorted by probability, then baseline rating.
    pub qualification: Vec<QualificationOdds>,
}

/// Streaming accumulator. Feed season results in index order.
#[derive(Debug, Clone)]
pub struct FairnessAccumulator {
    scenario: String,
    top_k: HashSet<CompetitorId>,
    thresholds: Vec<f64>,
    total: usize,
    valid: usize,
    baseline_sum: f64,
    // Welford running mean and squared deviations of per-season live means.
    live_mean: f64,
    live_m2: f64,
    hits: usize,
    below: Vec<(usize, usize)>,
    min_rating: f64,
    counts: BTreeMap<CompetitorId, usize>,
}

impl FairnessAccumulator {
    /// `top_k` is the baseline top of the pool the hit rate compares against.
    pub fn new(scenario: impl Into<String>, top_k: Vec<CompetitorId>, thresholds: &[f64]) -> Self {
        Self {
            scenario: scenario.into(),
            top_k: top_k.into_iter().collect(),
            thresholds: thresholds.to_vec(),
            total: 0,
            valid: 0,
            baseline_sum: 0.0,
            live_mean: 0.0,
            live_m2: 0.0,
            hits: 0,
            below: vec![(0, 0); thresholds.len()],
            min_rating: f64::INFINITY,
            counts: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, season: &SeasonResult) {
        self.total += 1;
        let (Some(baseline), Some(live)) = (season.mean_baseline(), season.mean_live()) else {
            return;
        };
        self.valid += 1;
        self.baseline_sum += baseline;
        let delta = live - self.live_mean;
        self.live_mean += delta / self.valid as f64;
        self.live_m2 += delta * (live - self.live_mean);

        let ids: HashSet<CompetitorId> = season.qualifiers.iter().map(|q| q.id).collect();
        if ids == self.top_k {
            self.hits += 1;
        }
        for (i, &threshold) in self.thresholds.iter().enumerate() {
            let n = season.qualifiers.iter().filter(|q| q.baseline < threshold).count();
            self.below[i].0 += n;
            if n > 0 {
                self.below[i].1 += 1;
            }
        }
        for q in &season.qualifiers {
            self.min_rating = self.min_rating.min(q.baseline);
            *self.counts.entry(q.id).or_insert(0) += 1;
        }
    }

    pub fn valid_seasons(&self) -> usize {
        self.valid
    }

    /// `None` when no season produced a qualifier.
    pub fn finish(self, pool: &CompetitorPool) -> Option<MonteCarloSummary> {
        if self.valid == 0 {
            return None;
        }
        let n = self.valid as f64;
        let variance = (self.live_m2 / n).max(0.0);

        let top_k_coverage = if self.top_k.is_empty() {
            0.0
        } else {
            let hits: usize = self
                .top_k
                .iter()
                .map(|id| self.counts.get(id).copied().unwrap_or(0))
                .sum();
            hits as f64 / (n * self.top_k.len() as f64)
        };

        let thresholds = self
            .thresholds
            .iter()
            .zip(&self.below)
            .map(|(&threshold, &(total_below, seasons))| ThresholdCount {
                threshold,
                total_below,
                mean_per_season: total_below as f64 / n,
                season_rate: seasons as f64 / n,
            })
            .collect();

        let mut qualification: Vec<QualificationOdds> = self
            .counts
            .iter()
            .filter_map(|(&id, &count)| {
                pool.get(id).map(|c| QualificationOdds {
                    id,
                    name: c.name.clone(),
                    baseline: c.baseline,
                    probability: count as f64 / n,
                })
            })
            .collect();
        qualification.sort_by(|a, b| {
            b.probability
                .total_cmp(&a.probability)
                .then(b.baseline.total_cmp(&a.baseline))
                .then(a.id.cmp(&b.id))
        });

        Some(MonteCarloSummary {
            scenario: self.scenario,
            total_seasons: self.total,
            valid_seasons: self.valid,
            mean_baseline: self.baseline_sum / n,
            mean_live: self.live_mean,
            std_live: variance.sqrt(),
            top_k_hit_rate: self.hits as f64 / n,
            top_k_coverage,
            thresholds,
            min_qualifier_rating: self.min_rating,
            qualification,
        })
    }
}

impl MonteCarloSummary {
    /// Qualification probability of `id`, zero if it never qualified.
    pub fn probability_of(&self, id: CompetitorId) -> f64 {
        self.qualification
            .iter()
            .find(|o| o.id == id)
            .map_or(0.0, |o| o.probability)
    }
}
