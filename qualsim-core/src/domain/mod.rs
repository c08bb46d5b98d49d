//! Domain types: competitors, the immutable pool, per-season rosters and the
//! qualified set.

pub mod competitor;
pub mod ids;
pub mod pool;
pub mod qualified;
pub mod roster;

pub use competitor::Competitor;
pub use ids::CompetitorId;
pub use pool::{CompetitorPool, PoolError};
pub use qualified::{QualifiedSet, QualifyError};
pub use roster::Roster;

/// Ranked finishing order of one event, best first.
pub type Standing = Vec<CompetitorId>;
