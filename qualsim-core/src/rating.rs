//! Elo-style rating model: pairwise outcome sampling and immediate updates.
//!
//! Every simulated game updates both live ratings before the next game is
//! drawn, so later pairings in the same event (and later events in the same
//! season) see the new values.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::Competitor;

/// Outcome of a single game from A's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    AWin,
    Draw,
    BWin,
}

impl GameOutcome {
    /// Score for A (1 / 0.5 / 0).
    pub fn score_a(self) -> f64 {
        match self {
            GameOutcome::AWin => 1.0,
            GameOutcome::Draw => 0.5,
            GameOutcome::BWin => 0.0,
        }
    }

    pub fn score_b(self) -> f64 {
        1.0 - self.score_a()
    }
}

/// Winner of a multi-game mini-match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchWinner {
    A,
    B,
}

/// Expected score of A against B.
pub fn expected_score(ra: f64, rb: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((rb - ra) / 400.0))
}

/// Rating model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingModel {
    /// K-factor applied to every game.
    pub k_factor: f64,
    /// Draw probability between equally rated players.
    pub draw_max: f64,
    /// Floor for the draw probability at large rating gaps.
    pub draw_min: f64,
    /// Rating gap over which the draw probability decays by a factor of e.
    pub draw_scale: f64,
}

impl Default for RatingModel {
    fn default() -> Self {
        Self {
            k_factor: 10.0,
            draw_max: 0.55,
            draw_min: 0.15,
            draw_scale: 400.0,
        }
    }
}

impl RatingModel {
    /// Draw probability, non-increasing in `|ra - rb|` and bounded in [0, 1].
    pub fn draw_probability(&self, ra: f64, rb: f64) -> f64 {
        let gap = (ra - rb).abs();
        let decayed = if self.draw_scale > 0.0 {
            self.draw_max * (-gap / self.draw_scale).exp()
        } else {
            0.0
        };
        decayed.max(self.draw_min).clamp(0.0, 1.0)
    }

    /// Sample an outcome without touching ratings. Consumes one draw.
    ///
    /// A draw happens with [`Self::draw_probability`]; otherwise A wins with
    /// probability equal to its expected score.
    pub fn sample_outcome<R: Rng + ?Sized>(&self, ra: f64, rb: f64, rng: &mut R) -> GameOutcome {
        let p_draw = self.draw_probability(ra, rb);
        let u: f64 = rng.gen();
        if u < p_draw {
            return GameOutcome::Draw;
        }
        let conditional = (u - p_draw) / (1.0 - p_draw);
        if conditional < expected_score(ra, rb) {
            GameOutcome::AWin
        } else {
            GameOutcome::BWin
        }
    }

    /// Apply one game's result (`score_a` in {0, 0.5, 1}) to both ratings.
    pub fn apply_result(&self, a: &mut Competitor, b: &mut Competitor, score_a: f64) {
        let ea = expected_score(a.rating, b.rating);
        let eb = 1.0 - ea;
        a.rating += self.k_factor * (score_a - ea);
        b.rating += self.k_factor * ((1.0 - score_a) - eb);
    }

    /// Play one game between A and B and update both ratings in place.
    pub fn simulate_game<R: Rng + ?Sized>(
        &self,
        a: &mut Competitor,
        b: &mut Competitor,
        rng: &mut R,
    ) -> GameOutcome {
        let outcome = self.sample_outcome(a.rating, b.rating, rng);
        self.apply_result(a, b, outcome.score_a());
        outcome
    }

    /// Play a knockout mini-match. `a` is the higher seed.
    ///
    /// Plays `format.games` games; if level, up to `format.sudden_death_games`
    /// further games until one is decisive; if still level, an armageddon game
    /// that cannot be drawn and favours the higher seed by
    /// `format.armageddon_edge`.
    pub fn play_match<R: Rng + ?Sized>(
        &self,
        a: &mut Competitor,
        b: &mut Competitor,
        format: &MatchFormat,
        rng: &mut R,
    ) -> MatchWinner {
        let mut margin = 0.0;
        for _ in 0..format.games {
            margin += self.simulate_game(a, b, rng).score_a() - 0.5;
        }
        if margin > 0.0 {
            return MatchWinner::A;
        }
        if margin < 0.0 {
            return MatchWinner::B;
        }

        for _ in 0..format.sudden_death_games {
            match self.simulate_game(a, b, rng) {
                GameOutcome::AWin => return MatchWinner::A,
                GameOutcome::BWin => return MatchWinner::B,
                GameOutcome::Draw => {}
            }
        }

        let p_a = (expected_score(a.rating, b.rating) + format.armageddon_edge).clamp(0.0, 1.0);
        if rng.gen::<f64>() < p_a {
            self.apply_result(a, b, 1.0);
            MatchWinner::A
        } else {
            self.apply_result(a, b, 0.0);
            MatchWinner::B
        }
    }
}

/// Mini-match format for knockout ties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchFormat {
    pub games: u32,
    pub sudden_death_games: u32,
    /// Added to the higher seed's expected score in the armageddon game.
    pub armageddon_edge: f64,
}

impl Default for MatchFormat {
    fn default() -> Self {
        Self {
            games: 2,
            sudden_death_games: 2,
            armageddon_edge: 0.05,
        }
    }
}
