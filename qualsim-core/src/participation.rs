//! Participation and eligibility resolution.
//!
//! Decides, per event slot, who sits at the board, and per standing, who may
//! be awarded a spot. Competitors without a directive compete in everything
//! and are eligible for everything.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{CompetitorId, QualifiedSet, Roster, Standing};

/// How a competitor takes part in the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationMode {
    /// Plays events and can qualify through any path.
    #[default]
    Full,
    /// Plays events (ratings move) but can never take a spot, e.g. a reigning champion.
    PlaysNotEligible,
    /// Neither plays nor qualifies.
    Excluded,
    /// Never plays; can still qualify through a rating list.
    RatingOnly,
}

impl ParticipationMode {
    pub fn competes(self) -> bool {
        matches!(self, Self::Full | Self::PlaysNotEligible)
    }

    pub fn eligible(self) -> bool {
        matches!(self, Self::Full | Self::RatingOnly)
    }
}

/// Per-competitor participation rules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipationDirective {
    pub mode: ParticipationMode,
    /// Event ids this competitor never enters, whatever the mode.
    pub blocked_events: BTreeSet<String>,
    /// Overrides the slot's skip probability once this competitor is qualified.
    pub qualified_skip_prob: Option<f64>,
}

static DEFAULT_DIRECTIVE: ParticipationDirective = ParticipationDirective {
    mode: ParticipationMode::Full,
    blocked_events: BTreeSet::new(),
    qualified_skip_prob: None,
};

/// Resolves participants and eligibility from a set of directives.
#[derive(Debug, Clone, Default)]
pub struct ParticipationResolver {
    directives: BTreeMap<CompetitorId, ParticipationDirective>,
}

impl ParticipationResolver {
    pub fn new(directives: BTreeMap<CompetitorId, ParticipationDirective>) -> Self {
        Self { directives }
    }

    pub fn directive(&self, id: CompetitorId) -> &ParticipationDirective {
        self.directives.get(&id).unwrap_or(&DEFAULT_DIRECTIVE)
    }

    /// Whether `id` enters `event_id` this time.
    ///
    /// Checks are ordered: mode, block-list, then, for qualified competitors
    /// only, one Bernoulli skip draw. No draw is consumed for anyone else.
    pub fn competes_in<R: Rng + ?Sized>(
        &self,
        id: CompetitorId,
        event_id: &str,
        slot_skip_prob: f64,
        qualified: &QualifiedSet,
        rng: &mut R,
    ) -> bool {
        let directive = self.directive(id);
        if !directive.mode.competes() {
            return false;
        }
        if directive.blocked_events.contains(event_id) {
            return false;
        }
        if qualified.contains(id) {
            let p = directive.qualified_skip_prob.unwrap_or(slot_skip_prob);
            if rng.gen::<f64>() < p {
                return false;
            }
        }
        true
    }

    /// Participant pool for one event, in roster order.
    pub fn participants<R: Rng + ?Sized>(
        &self,
        roster: &Roster,
        event_id: &str,
        slot_skip_prob: f64,
        qualified: &QualifiedSet,
        rng: &mut R,
    ) -> Vec<CompetitorId> {
        roster
            .iter()
            .map(|c| c.id)
            .filter(|&id| self.competes_in(id, event_id, slot_skip_prob, qualified, rng))
            .collect()
    }

    /// Competitors with an explicit directive.
    pub fn directive_ids(&self) -> impl Iterator<Item = CompetitorId> + '_ {
        self.directives.keys().copied()
    }

    pub fn is_eligible(&self, id: CompetitorId) -> bool {
        self.directive(id).mode.eligible()
    }

    /// Drop ineligible competitors from a standing so their positions pass
    /// down. Already-qualified competitors stay: allocation decides what their
    /// positions are worth.
    pub fn eligible_standing(&self, standing: &[CompetitorId]) -> Standing {
        standing
            .iter()
            .copied()
            .filter(|&id| self.is_eligible(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Competitor, CompetitorPool};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster() -> Roster {
        CompetitorPool::new(
            (1..=5)
                .map(|i| Competitor::new(i, format!("p{i}"), 2800.0 - i as f64 * 10.0))
                .collect(),
        )
        .unwrap()
        .roster()
    }

    fn resolver() -> ParticipationResolver {
        let mut d = BTreeMap::new();
        d.insert(
            CompetitorId(2),
            ParticipationDirective {
                mode: ParticipationMode::Excluded,
                ..Default::default()
            },
        );
        d.insert(
            CompetitorId(3),
            ParticipationDirective {
                mode: ParticipationMode::RatingOnly,
                ..Default::default()
            },
        );
        d.insert(
            CompetitorId(4),
            ParticipationDirective {
                mode: ParticipationMode::PlaysNotEligible,
                ..Default::default()
            },
        );
        d.insert(
            CompetitorId(5),
            ParticipationDirective {
                blocked_events: ["world_cup".to_string()].into_iter().collect(),
                ..Default::default()
            },
        );
        ParticipationResolver::new(d)
    }

    #[test]
    fn modes_and_block_lists_decide_participants() {
        let mut rng = StdRng::seed_from_u64(1);
        let q = QualifiedSet::new(8);
        let r = resolver();
        let wc = r.participants(&roster(), "world_cup", 0.0, &q, &mut rng);
        assert_eq!(wc, vec![CompetitorId(1), CompetitorId(4)]);
        let gs = r.participants(&roster(), "grand_swiss", 0.0, &q, &mut rng);
        assert_eq!(gs, vec![CompetitorId(1), CompetitorId(4), CompetitorId(5)]);
    }

    #[test]
    fn rating_only_never_competes_even_when_qualified() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut q = QualifiedSet::new(8);
        q.insert(CompetitorId(3)).unwrap();
        let r = resolver();
        assert!(!r.competes_in(CompetitorId(3), "grand_swiss", 0.0, &q, &mut rng));
    }

    #[test]
    fn qualified_competitors_skip_with_certainty() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut q = QualifiedSet::new(8);
        q.insert(CompetitorId(1)).unwrap();
        let r = ParticipationResolver::default();
        let p = r.participants(&roster(), "grand_swiss", 1.0, &q, &mut rng);
        assert!(!p.contains(&CompetitorId(1)));
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn directive_override_beats_slot_probability() {
        let mut d = BTreeMap::new();
        d.insert(
            CompetitorId(1),
            ParticipationDirective {
                qualified_skip_prob: Some(0.0),
                ..Default::default()
            },
        );
        let r = ParticipationResolver::new(d);
        let mut q = QualifiedSet::new(8);
        q.insert(CompetitorId(1)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            assert!(r.competes_in(CompetitorId(1), "world_cup", 1.0, &q, &mut rng));
        }
    }

    #[test]
    fn eligible_standing_keeps_qualified_drops_ineligible() {
        let r = resolver();
        let standing = vec![
            CompetitorId(4),
            CompetitorId(1),
            CompetitorId(2),
            CompetitorId(3),
        ];
        assert_eq!(
            r.eligible_standing(&standing),
            vec![CompetitorId(1), CompetitorId(3)]
        );
    }
}
