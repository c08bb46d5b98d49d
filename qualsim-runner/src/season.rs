//! Season orchestrator.
//!
//! One season runs every slot of a [`SeasonConfig`] in priority order over a
//! fresh copy of the pool's ratings. Live ratings and the qualified set carry
//! over from slot to slot. Every slot runs even once the target is reached.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use qualsim_core::allocation::Allocator;
use qualsim_core::domain::{CompetitorId, CompetitorPool, QualifiedSet, QualifyError, Roster, Standing};

use crate::config::{EventSlot, SeasonConfig};

/// Fatal problems inside a season.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SeasonError {
    #[error("slot {slot} ({event}): {source}")]
    Qualify {
        slot: usize,
        event: String,
        #[source]
        source: QualifyError,
    },

    #[error("directive names competitor {0}, who is not in the pool")]
    UnknownCompetitor(CompetitorId),
}

/// Orchestrator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeasonState {
    Idle,
    Running { slot_index: usize },
    Complete,
}

/// What one slot did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotOutcome {
    pub event_id: String,
    pub participants: usize,
    pub standing_len: usize,
    /// Newly qualified, in allocation order.
    pub qualified: Vec<CompetitorId>,
}

/// A qualifier with its pre- and post-season ratings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualifierRecord {
    pub id: CompetitorId,
    pub name: String,
    pub baseline: f64,
    pub live: f64,
    /// Index of the slot it qualified through.
    pub slot: usize,
}

/// Output of one season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonResult {
    pub qualifiers: Vec<QualifierRecord>,
    pub slots: Vec<SlotOutcome>,
}

impl SeasonResult {
    pub fn ids(&self) -> Vec<CompetitorId> {
        self.qualifiers.iter().map(|q| q.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.qualifiers.is_empty()
    }

    pub fn mean_baseline(&self) -> Option<f64> {
        mean(self.qualifiers.iter().map(|q| q.baseline))
    }

    pub fn mean_live(&self) -> Option<f64> {
        mean(self.qualifiers.iter().map(|q| q.live))
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = values.len();
    (n > 0).then(|| values.sum::<f64>() / n as f64)
}

/// State of one season in progress.
pub struct Season<'a> {
    config: &'a SeasonConfig,
    roster: Roster,
    qualified: QualifiedSet,
    state: SeasonState,
    slot_of: Vec<usize>,
    outcomes: Vec<SlotOutcome>,
}

impl<'a> Season<'a> {
    /// Clone the pool's ratings and check that every directive names a
    /// competitor in the pool.
    pub fn new(pool: &CompetitorPool, config: &'a SeasonConfig) -> Result<Self, SeasonError> {
        check_directives(pool, config)?;
        Ok(Self {
            config,
            roster: pool.roster(),
            qualified: QualifiedSet::new(config.target_candidates),
            state: SeasonState::Idle,
            slot_of: Vec::with_capacity(config.target_candidates),
            outcomes: Vec::with_capacity(config.slots.len()),
        })
    }

    pub fn state(&self) -> SeasonState {
        self.state
    }

    pub fn qualified(&self) -> &QualifiedSet {
        &self.qualified
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Run the next slot. Returns `false` once every slot has run.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<bool, SeasonError> {
        let index = match self.state {
            SeasonState::Idle => 0,
            SeasonState::Running { slot_index } => slot_index + 1,
            SeasonState::Complete => return Ok(false),
        };
        let Some(slot) = self.config.slots.get(index) else {
            self.state = SeasonState::Complete;
            return Ok(false);
        };
        self.state = SeasonState::Running { slot_index: index };

        let participants = self.participants(slot, rng);
        if participants.len() < 2 && !slot.format.is_rating_list() {
            warn!(slot = index, event = %slot.event_id, participants = participants.len(), "event has too few participants");
        }

        let standing = slot.format.get_standings(
            &mut self.roster,
            &participants,
            slot.standing_depth,
            &self.config.rating_model,
            rng,
        );
        let eligible = self.config.resolver.eligible_standing(&standing);

        let mut newly = slot.strategy.allocate(&eligible, slot.max_spots, &self.qualified);
        newly.truncate(self.qualified.room());
        for &id in &newly {
            self.qualified
                .insert(id)
                .map_err(|source| SeasonError::Qualify {
                    slot: index,
                    event: slot.event_id.clone(),
                    source,
                })?;
            self.slot_of.push(index);
        }

        debug!(
            slot = index,
            event = %slot.event_id,
            strategy = slot.strategy.name(),
            participants = participants.len(),
            standing = standing.len(),
            qualified = newly.len(),
            total = self.qualified.len(),
            "slot complete"
        );
        self.outcomes.push(SlotOutcome {
            event_id: slot.event_id.clone(),
            participants: participants.len(),
            standing_len: standing.len(),
            qualified: newly,
        });
        Ok(true)
    }

    /// Rating lists rank the whole roster and draw nothing; other events go
    /// through the participation resolver.
    fn participants<R: Rng + ?Sized>(&self, slot: &EventSlot, rng: &mut R) -> Standing {
        if slot.format.is_rating_list() {
            return self
                .roster
                .iter()
                .map(|c| c.id)
                .filter(|&id| {
                    !self
                        .config
                        .resolver
                        .directive(id)
                        .blocked_events
                        .contains(&slot.event_id)
                })
                .collect();
        }
        self.config.resolver.participants(
            &self.roster,
            &slot.event_id,
            slot.qualified_skip_prob,
            &self.qualified,
            rng,
        )
    }

    /// Run all remaining slots and produce the result.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> Result<SeasonResult, SeasonError> {
        while self.step(rng)? {}
        Ok(self.finish())
    }

    /// Freeze the qualified set into a result.
    pub fn finish(self) -> SeasonResult {
        let qualifiers = self
            .qualified
            .members()
            .iter()
            .zip(&self.slot_of)
            .filter_map(|(&id, &slot)| {
                self.roster.get(id).map(|c| QualifierRecord {
                    id,
                    name: c.name.clone(),
                    baseline: c.baseline,
                    live: c.rating,
                    slot,
                })
            })
            .collect();
        SeasonResult {
            qualifiers,
            slots: self.outcomes,
        }
    }
}

fn check_directives(pool: &CompetitorPool, config: &SeasonConfig) -> Result<(), SeasonError> {
    match config
        .resolver
        .directive_ids()
        .find(|&id| pool.get(id).is_none())
    {
        Some(id) => Err(SeasonError::UnknownCompetitor(id)),
        None => Ok(()),
    }
}

/// Run one full season.
pub fn run_season<R: Rng + ?Sized>(
    pool: &CompetitorPool,
    config: &SeasonConfig,
    rng: &mut R,
) -> Result<SeasonResult, SeasonError> {
    Season::new(pool, config)?.run(rng)
}
