use serde::{Deserialize, Serialize};

use super::CompetitorId;

/// A rated competitor.
///
/// `rating` is the live rating and moves after every simulated game.
/// `baseline` is captured when the season's roster is built and never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub name: String,
    pub rating: f64,
    pub baseline: f64,
}

impl Competitor {
    pub fn new(id: impl Into<CompetitorId>, name: impl Into<String>, rating: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating,
            baseline: rating,
        }
    }

    /// Live rating change since the baseline was captured.
    pub fn rating_delta(&self) -> f64 {
        self.rating - self.baseline
    }
}
