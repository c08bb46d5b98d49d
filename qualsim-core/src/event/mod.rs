//! Event simulators.
//!
//! Every format consumes a participant pool and the rating model and produces
//! a ranked [`Standing`]. Ratings in the roster move as games are played.
//!
//! ## Formats
//!
//! - [`EventFormat::Knockout`]: seeded single elimination with byes
//! - [`EventFormat::Swiss`]: score-group pairing over a fixed number of rounds
//! - [`EventFormat::Circuit`]: a series of Swiss sub-events awarding points
//! - [`EventFormat::RatingList`]: no games; participants ranked by live rating

pub mod circuit;
pub mod field;
pub mod knockout;
pub mod swiss;

pub use circuit::{CircuitConfig, CircuitEvent};
pub use field::FieldSelection;
pub use knockout::KnockoutConfig;
pub use swiss::{SwissConfig, SwissEntry};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CompetitorId, Roster, Standing};
use crate::rating::RatingModel;

/// Structural problems with an event format.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormatError {
    #[error("knockout capacity {0} is not a power of two >= 2")]
    BadCapacity(usize),
    #[error("knockout mini-match must have at least one game")]
    NoGames,
    #[error("{0} must have at least one round")]
    NoRounds(String),
    #[error("{0} must have a field size of at least 2")]
    FieldTooSmall(String),
    #[error("circuit has no sub-events")]
    EmptyCircuit,
    #[error("circuit has no basic points schedule")]
    EmptyPointsSchedule,
    #[error("{name} must be finite and non-negative, got {value}")]
    BadValue { name: String, value: f64 },
}

/// Closed set of event formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum EventFormat {
    Knockout(KnockoutConfig),
    Swiss(SwissConfig),
    Circuit(CircuitConfig),
    RatingList,
}

impl EventFormat {
    /// Whether this format ranks by rating instead of playing games.
    pub fn is_rating_list(&self) -> bool {
        matches!(self, Self::RatingList)
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        match self {
            Self::Knockout(k) => {
                if k.capacity < 2 || !k.capacity.is_power_of_two() {
                    return Err(FormatError::BadCapacity(k.capacity));
                }
                if k.match_format.games == 0 {
                    return Err(FormatError::NoGames);
                }
                check_non_negative("armageddon_edge", k.match_format.armageddon_edge)?;
                check_selection(&k.field_selection)
            }
            Self::Swiss(s) => {
                if s.rounds == 0 {
                    return Err(FormatError::NoRounds("swiss".into()));
                }
                if s.field_size < 2 {
                    return Err(FormatError::FieldTooSmall("swiss".into()));
                }
                check_non_negative("bye_points", s.bye_points)?;
                check_selection(&s.field_selection)
            }
            Self::Circuit(c) => {
                if c.events.is_empty() {
                    return Err(FormatError::EmptyCircuit);
                }
                if c.basic_points.is_empty() {
                    return Err(FormatError::EmptyPointsSchedule);
                }
                for event in &c.events {
                    if event.rounds == 0 {
                        return Err(FormatError::NoRounds(event.name.clone()));
                    }
                    if event.field_size < 2 {
                        return Err(FormatError::FieldTooSmall(event.name.clone()));
                    }
                    check_non_negative("weight", event.weight)?;
                }
                for &b in &c.basic_points {
                    check_non_negative("basic_points", b)?;
                }
                check_non_negative("bye_points", c.bye_points)?;
                check_selection(&c.field_selection)
            }
            Self::RatingList => Ok(()),
        }
    }

    /// Run the event and return its standing, truncated to `top_n` if given.
    ///
    /// Fewer than two participants is not an error: no games are played and
    /// the standing is empty (a rating list still ranks whoever it is given).
    pub fn get_standings<R: Rng + ?Sized>(
        &self,
        roster: &mut Roster,
        participants: &[CompetitorId],
        top_n: Option<usize>,
        model: &RatingModel,
        rng: &mut R,
    ) -> Standing {
        let mut standing = match self {
            Self::Knockout(config) => knockout::run(config, roster, participants, model, rng),
            Self::Swiss(config) => swiss::run(config, roster, participants, model, rng),
            Self::Circuit(config) => circuit::run(config, roster, participants, model, rng),
            Self::RatingList => {
                let mut ranked = participants.to_vec();
                roster.sort_by_seed(&mut ranked);
                ranked
            }
        };
        if let Some(n) = top_n {
            standing.truncate(n);
        }
        standing
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), FormatError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FormatError::BadValue {
            name: name.to_string(),
            value,
        })
    }
}

fn check_selection(selection: &FieldSelection) -> Result<(), FormatError> {
    match *selection {
        FieldSelection::TopRated => Ok(()),
        FieldSelection::WeightedByRating { pivot, scale } => {
            if !pivot.is_finite() {
                return Err(FormatError::BadValue {
                    name: "pivot".into(),
                    value: pivot,
                });
            }
            check_non_negative("scale", scale)
        }
    }
}
