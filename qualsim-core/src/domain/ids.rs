use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable competitor identifier (e.g. a federation id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorId(pub u64);

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CompetitorId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
