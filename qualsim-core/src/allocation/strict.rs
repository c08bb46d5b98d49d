//! Strict top-N: only the first `max_spots` finishing positions qualify.

use crate::domain::{CompetitorId, QualifiedSet};

use super::Allocator;

/// Positions held by already-qualified competitors are lost, not passed down.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictTopN;

impl Allocator for StrictTopN {
    fn allocate(
        &self,
        standing: &[CompetitorId],
        max_spots: usize,
        qualified: &QualifiedSet,
    ) -> Vec<CompetitorId> {
        standing
            .iter()
            .take(max_spots)
            .copied()
            .filter(|id| !qualified.contains(*id))
            .collect()
    }

    fn name(&self) -> &str {
        "strict_top_n"
    }
}
