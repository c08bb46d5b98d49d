//! Single-elimination knockout with a fixed bracket capacity.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::domain::{CompetitorId, Roster, Standing};
use crate::rating::{MatchFormat, MatchWinner, RatingModel};

use super::field::FieldSelection;

/// Knockout parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockoutConfig {
    /// Bracket size. Must be a power of two; missing entrants become byes.
    pub capacity: usize,
    pub match_format: MatchFormat,
    pub field_selection: FieldSelection,
}

impl Default for KnockoutConfig {
    fn default() -> Self {
        Self {
            capacity: 128,
            match_format: MatchFormat::default(),
            field_selection: FieldSelection::default(),
        }
    }
}

/// Run the bracket and return the full finishing order.
///
/// Entrants are seeded by live rating into bracket positions `0..capacity`;
/// each round pairs position `i` with position `len - 1 - i` and the winner
/// takes position `i`. Byes advance without playing. Losers are ranked by the
/// round they went out in (later is better), and by seed within a round.
pub(crate) fn run<R: Rng + ?Sized>(
    config: &KnockoutConfig,
    roster: &mut Roster,
    participants: &[CompetitorId],
    model: &RatingModel,
    rng: &mut R,
) -> Standing {
    let mut field = config
        .field_selection
        .select(roster, participants, config.capacity, rng);
    if field.len() < 2 {
        return Vec::new();
    }
    roster.sort_by_seed(&mut field);

    // Bracket slots hold seed indices into `field`.
    let mut slots: Vec<Option<usize>> = (0..config.capacity)
        .map(|i| (i < field.len()).then_some(i))
        .collect();
    // (round eliminated, seed)
    let mut eliminated: Vec<(usize, usize)> = Vec::with_capacity(field.len());
    let mut round = 0;

    while slots.len() > 1 {
        let n = slots.len();
        let mut next = Vec::with_capacity(n / 2);
        for i in 0..n / 2 {
            let advancing = match (slots[i], slots[n - 1 - i]) {
                (Some(x), Some(y)) => {
                    let (high, low) = if x < y { (x, y) } else { (y, x) };
                    let pair = roster.pair_mut(field[high], field[low]);
                    debug_assert!(pair.is_some(), "knockout entrants must be distinct roster members");
                    let winner = match pair {
                        Some((a, b)) => model.play_match(a, b, &config.match_format, rng),
                        None => {
                            warn!(high = %field[high], low = %field[low], "knockout tie without two roster entrants, higher seed advances");
                            MatchWinner::A
                        }
                    };
                    let (won, lost) = match winner {
                        MatchWinner::A => (high, low),
                        MatchWinner::B => (low, high),
                    };
                    let (winner_id, loser_id) = (field[won], field[lost]);
                    trace!(round, winner = %winner_id, loser = %loser_id, "knockout tie");
                    eliminated.push((round, lost));
                    Some(won)
                }
                (Some(x), None) | (None, Some(x)) => Some(x),
                (None, None) => None,
            };
            next.push(advancing);
        }
        slots = next;
        round += 1;
    }

    let mut standing = Vec::with_capacity(field.len());
    if let Some(champion) = slots.first().copied().flatten() {
        standing.push(field[champion]);
    }
    eliminated.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    standing.extend(eliminated.into_iter().map(|(_, seed)| field[seed]));
    standing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Competitor, CompetitorPool};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn roster(n: u64) -> Roster {
        CompetitorPool::new(
            (1..=n)
                .map(|i| Competitor::new(i, format!("p{i}"), 2800.0 - i as f64 * 8.0))
                .collect(),
        )
        .unwrap()
        .roster()
    }

    #[test]
    fn standing_ranks_every_entrant_once() {
        let mut r = roster(20);
        let ids = r.ids();
        let mut rng = StdRng::seed_from_u64(2);
        let standing = run(&KnockoutConfig::default(), &mut r, &ids, &RatingModel::default(), &mut rng);
        assert_eq!(standing.len(), 20);
        let unique: HashSet<_> = standing.iter().collect();
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn field_is_capped_at_capacity() {
        let mut r = roster(40);
        let ids = r.ids();
        let config = KnockoutConfig {
            capacity: 16,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let standing = run(&config, &mut r, &ids, &RatingModel::default(), &mut rng);
        assert_eq!(standing.len(), 16);
    }

    #[test]
    fn two_entrants_play_a_final() {
        let mut r = roster(2);
        let ids = r.ids();
        let mut rng = StdRng::seed_from_u64(5);
        let standing = run(&KnockoutConfig::default(), &mut r, &ids, &RatingModel::default(), &mut rng);
        assert_eq!(standing.len(), 2);
        let moved = r.iter().any(|c| c.rating_delta().abs() > 0.0);
        assert!(moved, "the final must update ratings");
    }

    #[test]
    fn single_entrant_yields_empty_standing() {
        let mut r = roster(3);
        let mut rng = StdRng::seed_from_u64(5);
        let standing = run(
            &KnockoutConfig::default(),
            &mut r,
            &[CompetitorId(1)],
            &RatingModel::default(),
            &mut rng,
        );
        assert!(standing.is_empty());
    }

    #[test]
    fn losers_rank_by_exit_round_then_seed() {
        // Gaps this large make every upset negligible, so the bracket plays
        // out to seed: 0v7 1v6 2v5 3v4, then 0v3 1v2, then 0v1.
        let mut r = CompetitorPool::new(
            (1..=8)
                .map(|i| Competitor::new(i, format!("p{i}"), 40_000.0 - i as f64 * 4_000.0))
                .collect(),
        )
        .unwrap()
        .roster();
        let model = RatingModel {
            k_factor: 0.0,
            draw_max: 0.0,
            draw_min: 0.0,
            ..Default::default()
        };
        let config = KnockoutConfig {
            capacity: 8,
            ..Default::default()
        };
        let ids = r.ids();
        for seed in 0..10 {
            let standing = run(&config, &mut r, &ids, &model, &mut StdRng::seed_from_u64(seed));
            assert_eq!(standing, (1..=8).map(CompetitorId).collect::<Vec<_>>());
        }
    }

    #[test]
    fn byes_rank_with_the_round_they_exit() {
        // Five entrants in an eight bracket: seeds 0..3 get byes, seed 3
        // plays seed 4. Round-one loser ranks last.
        let mut r = CompetitorPool::new(
            (1..=5)
                .map(|i| Competitor::new(i, format!("p{i}"), 40_000.0 - i as f64 * 4_000.0))
                .collect(),
        )
        .unwrap()
        .roster();
        let model = RatingModel {
            k_factor: 0.0,
            draw_max: 0.0,
            draw_min: 0.0,
            ..Default::default()
        };
        let config = KnockoutConfig {
            capacity: 8,
            ..Default::default()
        };
        let ids = r.ids();
        let standing = run(&config, &mut r, &ids, &model, &mut StdRng::seed_from_u64(3));
        assert_eq!(standing, (1..=5).map(CompetitorId).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_bracket() {
        let config = KnockoutConfig::default();
        let model = RatingModel::default();
        let mut r1 = roster(33);
        let mut r2 = roster(33);
        let ids = r1.ids();
        let s1 = run(&config, &mut r1, &ids, &model, &mut StdRng::seed_from_u64(21));
        let s2 = run(&config, &mut r2, &ids, &model, &mut StdRng::seed_from_u64(21));
        assert_eq!(s1, s2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "distinct roster members")]
    fn entrant_missing_from_roster_is_caught() {
        let mut r = roster(3);
        let mut rng = StdRng::seed_from_u64(1);
        run(
            &KnockoutConfig::default(),
            &mut r,
            &[CompetitorId(1), CompetitorId(999)],
            &RatingModel::default(),
            &mut rng,
        );
    }
}
