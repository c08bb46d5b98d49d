//! Allocation strategies: turn an event standing into new qualifiers
//!
//! A strategy sees the standing (best first), the slot's spot budget and the
//! current qualified set. It returns the competitors that qualify through
//! this slot, in the order they qualify. Strategies never mutate the
//! qualified set themselves; the season orchestrator inserts the result.

pub mod circuit;
pub mod rating;
pub mod spillover;
pub mod strict;

pub use circuit::CircuitAllocation;
pub use rating::RatingAllocation;
pub use spillover::Spillover;
pub use strict::StrictTopN;

use serde::{Deserialize, Serialize};

use crate::domain::{CompetitorId, QualifiedSet};

/// Spot allocation logic.
///
/// # Contract
/// - Output is duplicate-free and never contains an already-qualified id
/// - Output is a subset of `standing`, in standing order
/// - Output length never exceeds `max_spots`, except that rating allocation
///   fills at least its guarantee while room remains
/// - A short standing is not an error: return what is available
pub trait Allocator: Send + Sync {
    fn allocate(
        &self,
        standing: &[CompetitorId],
        max_spots: usize,
        qualified: &QualifiedSet,
    ) -> Vec<CompetitorId>;

    /// Strategy name for logging.
    fn name(&self) -> &str;
}

/// Serializable choice of strategy for an event slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AllocationStrategy {
    #[default]
    StrictTopN,
    Spillover,
    Circuit {
        #[serde(default = "default_base_spots")]
        base_spots: usize,
        #[serde(default = "default_circuit_max")]
        max_spots: usize,
    },
    Rating {
        #[serde(default = "default_guaranteed")]
        guaranteed_spots: usize,
    },
}

fn default_base_spots() -> usize {
    2
}

fn default_circuit_max() -> usize {
    3
}

fn default_guaranteed() -> usize {
    1
}

impl Allocator for AllocationStrategy {
    fn allocate(
        &self,
        standing: &[CompetitorId],
        max_spots: usize,
        qualified: &QualifiedSet,
    ) -> Vec<CompetitorId> {
        match *self {
            Self::StrictTopN => StrictTopN.allocate(standing, max_spots, qualified),
            Self::Spillover => Spillover.allocate(standing, max_spots, qualified),
            Self::Circuit {
                base_spots,
                max_spots: cap,
            } => CircuitAllocation::new(base_spots, cap).allocate(standing, max_spots, qualified),
            Self::Rating { guaranteed_spots } => {
                RatingAllocation::new(guaranteed_spots).allocate(standing, max_spots, qualified)
            }
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::StrictTopN => "strict_top_n",
            Self::Spillover => "spillover",
            Self::Circuit { .. } => "circuit",
            Self::Rating { .. } => "rating",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<CompetitorId> {
        raw.iter().copied().map(CompetitorId).collect()
    }

    #[test]
    fn enum_dispatches_to_each_strategy() {
        let mut q = QualifiedSet::new(8);
        q.insert(CompetitorId(1)).unwrap();
        let standing = ids(&[1, 2, 3, 4]);

        assert_eq!(AllocationStrategy::StrictTopN.allocate(&standing, 2, &q), ids(&[2]));
        assert_eq!(AllocationStrategy::Spillover.allocate(&standing, 2, &q), ids(&[2, 3]));
        let circuit = AllocationStrategy::Circuit {
            base_spots: 2,
            max_spots: 3,
        };
        assert_eq!(circuit.allocate(&standing, 3, &q), ids(&[2, 3, 4]));
        let rating = AllocationStrategy::Rating { guaranteed_spots: 1 };
        assert_eq!(rating.allocate(&standing, 0, &q), ids(&[2]));
    }

    #[test]
    fn strategy_parses_from_tagged_form() {
        let s: AllocationStrategy = serde_json::from_str(r#"{"type":"circuit"}"#).unwrap();
        assert_eq!(
            s,
            AllocationStrategy::Circuit {
                base_spots: 2,
                max_spots: 3
            }
        );
        let s: AllocationStrategy =
            serde_json::from_str(r#"{"type":"rating","guaranteed_spots":4}"#).unwrap();
        assert_eq!(s, AllocationStrategy::Rating { guaranteed_spots: 4 });
        assert_eq!(s.name(), "rating");
    }
}
