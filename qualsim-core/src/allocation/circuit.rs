//! Circuit allocation with a one-spot spillover bonus.

use crate::domain::{CompetitorId, QualifiedSet};

use super::Allocator;

/// Awards `base_spots` to the best not-yet-qualified finishers. If anyone in
/// the top `base_spots + 1` positions already qualified elsewhere, one bonus
/// spot goes to the next unqualified finisher.
///
/// The effective cap is the smaller of the slot budget and `max_spots`.
#[derive(Debug, Clone, Copy)]
pub struct CircuitAllocation {
    pub base_spots: usize,
    pub max_spots: usize,
}

impl CircuitAllocation {
    pub fn new(base_spots: usize, max_spots: usize) -> Self {
        Self {
            base_spots,
            max_spots,
        }
    }
}

impl Default for CircuitAllocation {
    fn default() -> Self {
        Self::new(2, 3)
    }
}

impl Allocator for CircuitAllocation {
    fn allocate(
        &self,
        standing: &[CompetitorId],
        max_spots: usize,
        qualified: &QualifiedSet,
    ) -> Vec<CompetitorId> {
        let cap = max_spots.min(self.max_spots);
        let window = (self.base_spots + 1).min(standing.len());
        let bonus = usize::from(standing[..window].iter().any(|id| qualified.contains(*id)));
        let awarded = (self.base_spots + bonus).min(cap);

        standing
            .iter()
            .copied()
            .filter(|id| !qualified.contains(*id))
            .take(awarded)
            .collect()
    }

    fn name(&self) -> &str {
        "circuit"
    }
}
