//! Spillover: fill the budget from the top, passing spots down past
//! competitors who already qualified.

use crate::domain::{CompetitorId, QualifiedSet};

use super::Allocator;

#[derive(Debug, Clone, Copy, Default)]
pub struct Spillover;

impl Allocator for Spillover {
    fn allocate(
        &self,
        standing: &[CompetitorId],
        max_spots: usize,
        qualified: &QualifiedSet,
    ) -> Vec<CompetitorId> {
        standing
            .iter()
            .copied()
            .filter(|id| !qualified.contains(*id))
            .take(max_spots)
            .collect()
    }

    fn name(&self) -> &str {
        "spillover"
    }
}
