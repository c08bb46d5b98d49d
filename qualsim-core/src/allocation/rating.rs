//! Rating allocation: highest live ratings not yet qualified.
//!
//! The standing handed to this strategy is the rating list, already ordered
//! by live rating and filtered to eligible competitors.

use crate::domain::{CompetitorId, QualifiedSet};

use super::Allocator;

#[derive(Debug, Clone, Copy)]
pub struct RatingAllocation {
    /// Minimum number of spots filled, budget permitting room.
    pub guaranteed_spots: usize,
}

impl RatingAllocation {
    pub fn new(guaranteed_spots: usize) -> Self {
        Self { guaranteed_spots }
    }

    /// Spots this strategy tries to fill: at least the guarantee, at most the
    /// room left in the qualified set.
    pub fn spots_to_fill(&self, max_spots: usize, qualified: &QualifiedSet) -> usize {
        self.guaranteed_spots.max(max_spots).min(qualified.room())
    }
}

impl Default for RatingAllocation {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Allocator for RatingAllocation {
    fn allocate(
        &self,
        standing: &[CompetitorId],
        max_spots: usize,
        qualified: &QualifiedSet,
    ) -> Vec<CompetitorId> {
        let spots = self.spots_to_fill(max_spots, qualified);
        standing
            .iter()
            .copied()
            .filter(|id| !qualified.contains(*id))
            .take(spots)
            .collect()
    }

    fn name(&self) -> &str {
        "rating"
    }
}
