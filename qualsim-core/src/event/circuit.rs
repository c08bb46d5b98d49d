//! Multi-event circuit: a series of Swiss sub-events awarding circuit points.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{CompetitorId, Roster, Standing};
use crate::rating::RatingModel;

use super::field::FieldSelection;
use super::swiss;

/// One sub-event of a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitEvent {
    pub name: String,
    pub field_size: usize,
    pub rounds: u32,
    /// Tournament average rating; drives the strength factor.
    pub average_rating: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl CircuitEvent {
    pub fn new(name: &str, field_size: usize, rounds: u32, average_rating: f64) -> Self {
        Self {
            name: name.to_string(),
            field_size,
            rounds,
            average_rating,
            weight: 1.0,
        }
    }

    /// `max(0, (TAR - 2500) / 100)`.
    pub fn strength_factor(&self) -> f64 {
        ((self.average_rating - 2500.0) / 100.0).max(0.0)
    }
}

/// Circuit parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitConfig {
    pub events: Vec<CircuitEvent>,
    /// Basic points by finishing place, winner first.
    pub basic_points: Vec<f64>,
    pub bye_points: f64,
    pub field_selection: FieldSelection,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            events: vec![
                CircuitEvent::new("SuperGM RR 1", 12, 11, 2750.0),
                CircuitEvent::new("SuperGM RR 2", 10, 9, 2730.0),
                CircuitEvent::new("Strong Open 1", 80, 9, 2650.0),
                CircuitEvent::new("Strong Open 2", 80, 9, 2670.0),
                CircuitEvent::new("SuperSwiss 1", 100, 11, 2700.0),
            ],
            basic_points: vec![11.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0],
            bye_points: 0.5,
            field_selection: FieldSelection::default(),
        }
    }
}

/// Circuit points earned by place `place` (0-based) in `event` with
/// `field_len` finishers. Only the top half of the field scores.
pub fn place_points(config: &CircuitConfig, event: &CircuitEvent, place: usize, field_len: usize) -> f64 {
    if place >= field_len / 2 {
        return 0.0;
    }
    config
        .basic_points
        .get(place)
        .map_or(0.0, |b| b * event.strength_factor() * event.weight)
}

/// Play every sub-event and return accumulated circuit points per competitor.
pub fn accumulate_points<R: Rng + ?Sized>(
    config: &CircuitConfig,
    roster: &mut Roster,
    participants: &[CompetitorId],
    model: &RatingModel,
    rng: &mut R,
) -> BTreeMap<CompetitorId, f64> {
    let mut totals: BTreeMap<CompetitorId, f64> = BTreeMap::new();
    for event in &config.events {
        let field = config
            .field_selection
            .select(roster, participants, event.field_size, rng);
        if field.len() < 2 {
            debug!(event = %event.name, entrants = field.len(), "circuit event skipped");
            continue;
        }
        let table = swiss::play(roster, &field, event.rounds, config.bye_points, model, rng);
        for (place, entry) in table.iter().enumerate() {
            let points = place_points(config, event, place, table.len());
            if points <= 0.0 {
                break;
            }
            *totals.entry(entry.id).or_insert(0.0) += points;
        }
    }
    totals
}

/// Circuit standing: competitors with positive points, by points then live
/// rating (seed order).
pub(crate) fn run<R: Rng + ?Sized>(
    config: &CircuitConfig,
    roster: &mut Roster,
    participants: &[CompetitorId],
    model: &RatingModel,
    rng: &mut R,
) -> Standing {
    let totals = accumulate_points(config, roster, participants, model, rng);
    let mut scored: Vec<(CompetitorId, f64)> =
        totals.into_iter().filter(|&(_, p)| p > 0.0).collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| roster.seed_cmp(a.0, b.0))
    });
    scored.into_iter().map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Competitor, CompetitorPool};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster(n: u64) -> Roster {
        CompetitorPool::new(
            (1..=n)
                .map(|i| Competitor::new(i, format!("p{i}"), 2800.0 - i as f64 * 3.0))
                .collect(),
        )
        .unwrap()
        .roster()
    }

    #[test]
    fn strength_factor_matches_schedule() {
        let e = CircuitEvent::new("x", 10, 9, 2750.0);
        assert!((e.strength_factor() - 2.5).abs() < 1e-12);
        assert_eq!(CircuitEvent::new("y", 10, 9, 2400.0).strength_factor(), 0.0);
    }

    #[test]
    fn only_top_half_scores() {
        let config = CircuitConfig::default();
        let event = CircuitEvent::new("x", 6, 5, 2700.0);
        assert!((place_points(&config, &event, 0, 6) - 22.0).abs() < 1e-12);
        assert!(place_points(&config, &event, 2, 6) > 0.0);
        assert_eq!(place_points(&config, &event, 3, 6), 0.0);
        // Places past the schedule score nothing even in a big field.
        assert_eq!(place_points(&config, &event, 8, 100), 0.0);
    }

    #[test]
    fn standing_is_sorted_by_points() {
        let config = CircuitConfig {
            events: vec![
                CircuitEvent::new("a", 10, 5, 2700.0),
                CircuitEvent::new("b", 10, 5, 2700.0),
            ],
            ..Default::default()
        };
        let mut r = roster(16);
        let ids = r.ids();
        let mut rng = StdRng::seed_from_u64(77);
        let mut check = r.clone();
        let totals = accumulate_points(&config, &mut check, &ids, &RatingModel::default(), &mut StdRng::seed_from_u64(77));
        let standing = run(&config, &mut r, &ids, &RatingModel::default(), &mut rng);
        assert!(!standing.is_empty());
        assert!(standing.len() <= 10);
        for w in standing.windows(2) {
            assert!(totals[&w[0]] >= totals[&w[1]]);
        }
    }

    #[test]
    fn too_few_entrants_score_nothing() {
        let mut r = roster(5);
        let mut rng = StdRng::seed_from_u64(1);
        let standing = run(
            &CircuitConfig::default(),
            &mut r,
            &[CompetitorId(1)],
            &RatingModel::default(),
            &mut rng,
        );
        assert!(standing.is_empty());
    }
}
