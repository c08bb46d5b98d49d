//! The competitor pool: the immutable universe a scenario draws from.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use super::{Competitor, CompetitorId, Roster};

/// Errors raised while building a pool.
#[derive(Debug, Error, PartialEq)]
pub enum PoolError {
    #[error("competitor pool is empty")]
    Empty,
    #[error("duplicate competitor id {0}")]
    DuplicateId(CompetitorId),
    #[error("competitor {id} has a non-finite rating")]
    NonFiniteRating { id: CompetitorId },
}

/// Ordered, de-duplicated collection of competitors with baseline ratings.
///
/// Built once by a loader and shared read-only between seasons; each season
/// takes its own mutable [`Roster`] via [`CompetitorPool::roster`].
#[derive(Debug, Clone, Serialize)]
pub struct CompetitorPool {
    competitors: Vec<Competitor>,
}

impl CompetitorPool {
    /// Build a pool, rejecting duplicate ids and non-finite ratings.
    ///
    /// Each competitor's baseline is reset to its rating: the pool is the
    /// snapshot every season starts from.
    pub fn new(competitors: Vec<Competitor>) -> Result<Self, PoolError> {
        if competitors.is_empty() {
            return Err(PoolError::Empty);
        }
        let mut seen = HashSet::with_capacity(competitors.len());
        let mut normalized = Vec::with_capacity(competitors.len());
        for mut competitor in competitors {
            if !competitor.rating.is_finite() {
                return Err(PoolError::NonFiniteRating { id: competitor.id });
            }
            if !seen.insert(competitor.id) {
                return Err(PoolError::DuplicateId(competitor.id));
            }
            competitor.baseline = competitor.rating;
            normalized.push(competitor);
        }
        Ok(Self {
            competitors: normalized,
        })
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.iter()
    }

    pub fn get(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.id == id)
    }

    /// Fresh mutable roster for one season. Live ratings start at baseline.
    pub fn roster(&self) -> Roster {
        Roster::new(self.competitors.clone())
    }

    /// The `k` highest-rated competitors by baseline, ties broken by id.
    ///
    /// This is the "true" top set that fairness statistics compare against.
    pub fn top_by_baseline(&self, k: usize) -> Vec<CompetitorId> {
        let mut ranked: Vec<&Competitor> = self.competitors.iter().collect();
        ranked.sort_by(|a, b| {
            b.baseline
                .partial_cmp(&a.baseline)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.into_iter().take(k).map(|c| c.id).collect()
    }
}
