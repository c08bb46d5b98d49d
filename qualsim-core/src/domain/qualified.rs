//! The qualified set accumulated over one season.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use super::CompetitorId;

/// Invariant violations on the qualified set. Always fatal for the season.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QualifyError {
    #[error("competitor {0} is already qualified")]
    Duplicate(CompetitorId),
    #[error("qualified set is full ({target} of {target}); cannot add {id}")]
    Overflow { id: CompetitorId, target: usize },
}

/// Ordered, duplicate-free list of qualifiers, capped at the target size.
#[derive(Debug, Clone, Serialize)]
pub struct QualifiedSet {
    target: usize,
    members: Vec<CompetitorId>,
    #[serde(skip)]
    lookup: HashSet<CompetitorId>,
}

impl QualifiedSet {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            members: Vec::with_capacity(target),
            lookup: HashSet::with_capacity(target),
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Spots still open before the target size is reached.
    pub fn room(&self) -> usize {
        self.target.saturating_sub(self.members.len())
    }

    pub fn is_full(&self) -> bool {
        self.room() == 0
    }

    pub fn contains(&self, id: CompetitorId) -> bool {
        self.lookup.contains(&id)
    }

    /// Members in qualification order.
    pub fn members(&self) -> &[CompetitorId] {
        &self.members
    }

    /// Append a qualifier. Never silently ignores a duplicate.
    pub fn insert(&mut self, id: CompetitorId) -> Result<(), QualifyError> {
        if self.lookup.contains(&id) {
            return Err(QualifyError::Duplicate(id));
        }
        if self.is_full() {
            return Err(QualifyError::Overflow {
                id,
                target: self.target,
            });
        }
        self.lookup.insert(id);
        self.members.push(id);
        Ok(())
    }

    pub fn into_members(self) -> Vec<CompetitorId> {
        self.members
    }
}
