//! Field selection for events whose nominal field is smaller than the pool of
//! willing participants.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{CompetitorId, Roster};

/// How an event picks its field from the participant pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldSelection {
    /// Highest live ratings, in seed order.
    TopRated,
    /// Weighted sampling without replacement. Weight is
    /// `1 + max(0, rating - pivot) / scale`, so stronger players are more
    /// likely to be invited while everyone keeps a chance.
    WeightedByRating { pivot: f64, scale: f64 },
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::WeightedByRating {
            pivot: 2600.0,
            scale: 200.0,
        }
    }
}

impl FieldSelection {
    /// Choose up to `size` competitors from `pool`.
    ///
    /// When the pool already fits, it is returned unchanged and no random
    /// draws are consumed.
    pub fn select<R: Rng + ?Sized>(
        &self,
        roster: &Roster,
        pool: &[CompetitorId],
        size: usize,
        rng: &mut R,
    ) -> Vec<CompetitorId> {
        if pool.len() <= size {
            return pool.to_vec();
        }
        match *self {
            Self::TopRated => {
                let mut ranked = pool.to_vec();
                roster.sort_by_seed(&mut ranked);
                ranked.truncate(size);
                ranked
            }
            Self::WeightedByRating { pivot, scale } => {
                let mut remaining = pool.to_vec();
                let mut weights: Vec<f64> = remaining
                    .iter()
                    .map(|&id| {
                        let excess = (roster.rating(id) - pivot).max(0.0);
                        if scale > 0.0 {
                            1.0 + excess / scale
                        } else {
                            1.0
                        }
                    })
                    .collect();
                let mut chosen = Vec::with_capacity(size);
                while chosen.len() < size {
                    let pick = match WeightedIndex::new(&weights) {
                        Ok(dist) => dist.sample(rng),
                        Err(_) => rng.gen_range(0..remaining.len()),
                    };
                    chosen.push(remaining.remove(pick));
                    weights.remove(pick);
                }
                chosen
            }
        }
    }
}
