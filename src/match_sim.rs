use std::fmt;

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::outcome::{Outcome, OutcomeProbs, classify_outcome};
use crate::team::TeamStats;

// Curated scorelines for the basic level, keyed by strength gap.
const VERY_STRONG_HOME: &[(u8, u8)] = &[(3, 0), (2, 0), (3, 1), (4, 1), (2, 1)];
const STRONG_HOME: &[(u8, u8)] = &[(2, 1), (1, 0), (3, 2), (2, 0)];
const VERY_STRONG_AWAY: &[(u8, u8)] = &[(0, 3), (0, 2), (1, 3), (1, 4), (1, 2)];
const STRONG_AWAY: &[(u8, u8)] = &[(1, 2), (0, 1), (2, 3), (0, 2)];
const EVEN: &[(u8, u8)] = &[(1, 1), (0, 0), (2, 2), (1, 0), (0, 1), (2, 1), (1, 2)];

const HOME_POTENTIAL_OFFSET: f64 = 50.0;
const AWAY_POTENTIAL_OFFSET: f64 = 40.0;
const POTENTIAL_JITTER: (f64, f64) = (0.7, 1.4);

const FORM_WEIGHT: f64 = 2.0;
const FATIGUE_RANGE: (i32, i32) = (2, 5);
const MOTIVATION_SPREAD: i32 = 8;
const STRENGTH_PER_GOAL: f64 = 25.0;

const DEFAULT_HOME_SCORED: f64 = 1.2;
const DEFAULT_HOME_CONCEDED: f64 = 1.2;
const DEFAULT_AWAY_SCORED: f64 = 1.0;
const DEFAULT_AWAY_CONCEDED: f64 = 1.4;
const FORM_GOALS_BASELINE: f64 = 5.0;
const FORM_GOALS_DIVISOR: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimLevel {
    #[default]
    Basic,
    Rating,
    Stats,
    Realistic,
}

impl SimLevel {
    pub const ALL: [SimLevel; 4] = [
        SimLevel::Basic,
        SimLevel::Rating,
        SimLevel::Stats,
        SimLevel::Realistic,
    ];

    /// Unrecognised names select the basic level.
    pub fn from_name(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rating" => SimLevel::Rating,
            "stats" => SimLevel::Stats,
            "realistic" => SimLevel::Realistic,
            _ => SimLevel::Basic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SimLevel::Basic => "basic",
            SimLevel::Rating => "rating",
            SimLevel::Stats => "stats",
            SimLevel::Realistic => "realistic",
        }
    }
}

impl From<&str> for SimLevel {
    fn from(raw: &str) -> Self {
        SimLevel::from_name(raw)
    }
}

impl fmt::Display for SimLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u8,
    pub away_goals: u8,
    pub outcome: Outcome,
    pub level: SimLevel,
}

impl MatchResult {
    pub fn scoreline(&self) -> String {
        format!("{}-{}", self.home_goals, self.away_goals)
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.home_team,
            self.scoreline(),
            self.away_team
        )
    }
}

/// Per-match random adjustments of the stats level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Swing {
    fatigue: i32,
    motivation: i32,
}

#[derive(Debug, Clone, Default)]
pub struct MatchSimulator {
    pub config: SimConfig,
}

impl MatchSimulator {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Plays one match. Missing stats are treated as a neutral 50-rated side.
    #[allow(clippy::too_many_arguments)]
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        home_team: &str,
        away_team: &str,
        home_stats: Option<&TeamStats>,
        away_stats: Option<&TeamStats>,
        level: SimLevel,
        gameweek: u32,
        rng: &mut R,
    ) -> MatchResult {
        let neutral = TeamStats::neutral();
        let home = home_stats.unwrap_or(&neutral);
        let away = away_stats.unwrap_or(&neutral);

        let (home_goals, away_goals) = match level {
            SimLevel::Basic => self.simulate_basic(home, away, rng),
            SimLevel::Rating => self.simulate_rating(home, away, rng),
            SimLevel::Stats => self.simulate_stats(home, away, gameweek, rng),
            SimLevel::Realistic => self.simulate_realistic(home, away, rng),
        };
        let home_goals = home_goals.min(self.config.max_goals);
        let away_goals = away_goals.min(self.config.max_goals);

        debug!("{level}: {home_team} {home_goals}-{away_goals} {away_team}");

        MatchResult {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            home_goals,
            away_goals,
            outcome: classify_outcome(home_goals, away_goals),
            level,
        }
    }

    /// Rating noise plus home advantage, bucketed into curated scorelines.
    fn simulate_basic<R: Rng + ?Sized>(
        &self,
        home: &TeamStats,
        away: &TeamStats,
        rng: &mut R,
    ) -> (u8, u8) {
        let spread = self.config.randomness;
        let home_strength = i32::from(home.ratings.overall)
            + self.config.home_advantage
            + rng.gen_range(-spread..=spread);
        let away_strength = i32::from(away.ratings.overall) + rng.gen_range(-spread..=spread);

        let pool = basic_scorelines(home_strength - away_strength);
        pool.choose(rng).copied().unwrap_or((0, 0))
    }

    /// Attack vs. opposing defense sets a per-chance conversion rate.
    fn simulate_rating<R: Rng + ?Sized>(
        &self,
        home: &TeamStats,
        away: &TeamStats,
        rng: &mut R,
    ) -> (u8, u8) {
        let (lo, hi) = POTENTIAL_JITTER;
        let home_potential = goal_potential(
            home.ratings.attack,
            away.ratings.defense,
            HOME_POTENTIAL_OFFSET,
        ) * rng.gen_range(lo..hi);
        let away_potential = goal_potential(
            away.ratings.attack,
            home.ratings.defense,
            AWAY_POTENTIAL_OFFSET,
        ) * rng.gen_range(lo..hi);

        let home_p = home_potential.clamp(0.0, 1.0);
        let away_p = away_potential.clamp(0.0, 1.0);

        let mut home_goals = 0u8;
        let mut away_goals = 0u8;
        for _ in 0..self.config.chances {
            if rng.gen_bool(home_p) {
                home_goals = home_goals.saturating_add(1);
            }
            if rng.gen_bool(away_p) {
                away_goals = away_goals.saturating_add(1);
            }
        }
        (home_goals, away_goals)
    }

    /// Overall rating adjusted by form, fatigue and motivation, then sampled
    /// from a normal around the implied expected goals.
    fn simulate_stats<R: Rng + ?Sized>(
        &self,
        home: &TeamStats,
        away: &TeamStats,
        gameweek: u32,
        rng: &mut R,
    ) -> (u8, u8) {
        let swing = self.draw_swing(gameweek, rng);
        let (home_strength, away_strength) = self.stats_strengths(home, away, swing);

        let diff = home_strength - away_strength;
        let home_expected = self.config.base_goals + (diff / STRENGTH_PER_GOAL).max(0.0);
        let away_expected = self.config.base_goals + (-diff / STRENGTH_PER_GOAL).max(0.0);

        (
            sample_normal_goals(home_expected, self.config.goals_stddev, rng),
            sample_normal_goals(away_expected, self.config.goals_stddev, rng),
        )
    }

    /// Fatigue only bites after the configured gameweek; motivation is drawn
    /// for every match.
    fn draw_swing<R: Rng + ?Sized>(&self, gameweek: u32, rng: &mut R) -> Swing {
        let fatigue = if gameweek > self.config.fatigue_after_gameweek {
            rng.gen_range(FATIGUE_RANGE.0..=FATIGUE_RANGE.1)
        } else {
            0
        };
        let motivation = rng.gen_range(-MOTIVATION_SPREAD..=MOTIVATION_SPREAD);
        Swing {
            fatigue,
            motivation,
        }
    }

    /// Fatigue hits both sides equally; motivation moves strength from one side
    /// to the other.
    fn stats_strengths(&self, home: &TeamStats, away: &TeamStats, swing: Swing) -> (f64, f64) {
        let fatigue = f64::from(swing.fatigue);
        let motivation = f64::from(swing.motivation);
        let home_strength = f64::from(home.ratings.overall)
            + f64::from(self.config.home_advantage)
            + home.recent_form * FORM_WEIGHT
            - fatigue
            + motivation;
        let away_strength =
            f64::from(away.ratings.overall) + away.recent_form * FORM_WEIGHT - fatigue - motivation;
        (home_strength, away_strength)
    }

    /// Venue scoring rates blended with the opponent's concession rate, scaled
    /// by recent scoring form and drawn from a Poisson.
    fn simulate_realistic<R: Rng + ?Sized>(
        &self,
        home: &TeamStats,
        away: &TeamStats,
        rng: &mut R,
    ) -> (u8, u8) {
        let home_attack = home.goals_per_game_home.unwrap_or(DEFAULT_HOME_SCORED);
        let home_defense = home.conceded_per_game_home.unwrap_or(DEFAULT_HOME_CONCEDED);
        let away_attack = away.goals_per_game_away.unwrap_or(DEFAULT_AWAY_SCORED);
        let away_defense = away.conceded_per_game_away.unwrap_or(DEFAULT_AWAY_CONCEDED);

        let home_expected = (home_attack + away_defense) / 2.0 * form_multiplier(home);
        let away_expected = (away_attack + home_defense) / 2.0 * form_multiplier(away);

        (
            sample_poisson_goals(home_expected, rng),
            sample_poisson_goals(away_expected, rng),
        )
    }

    /// Closed-form estimate from overall ratings; independent of the simulation level.
    pub fn win_draw_loss_probability(
        &self,
        home_stats: Option<&TeamStats>,
        away_stats: Option<&TeamStats>,
    ) -> OutcomeProbs {
        let home = home_stats.map_or(crate::team::NEUTRAL_RATING, |s| s.ratings.overall);
        let away = away_stats.map_or(crate::team::NEUTRAL_RATING, |s| s.ratings.overall);
        let diff = i32::from(home) + self.config.home_advantage - i32::from(away);
        probability_bucket(diff)
    }
}

fn basic_scorelines(diff: i32) -> &'static [(u8, u8)] {
    if diff > 20 {
        VERY_STRONG_HOME
    } else if diff > 10 {
        STRONG_HOME
    } else if diff < -20 {
        VERY_STRONG_AWAY
    } else if diff < -10 {
        STRONG_AWAY
    } else {
        EVEN
    }
}

/// Fixed (home, draw, away) triple for a home-minus-away rating gap.
pub fn probability_bucket(diff: i32) -> OutcomeProbs {
    let (home, away) = if diff > 20 {
        (70, 10)
    } else if diff > 10 {
        (55, 20)
    } else if diff > 0 {
        (45, 25)
    } else if diff > -10 {
        (35, 35)
    } else if diff > -20 {
        (25, 50)
    } else {
        (15, 65)
    };
    OutcomeProbs::from_percent(home, away)
}

fn goal_potential(attack: u8, defense: u8, offset: f64) -> f64 {
    ((f64::from(attack) - f64::from(defense) + offset) / 100.0).max(0.0)
}

fn form_multiplier(stats: &TeamStats) -> f64 {
    let goals = stats
        .form_goals_last_5
        .map_or(FORM_GOALS_BASELINE, f64::from);
    1.0 + (goals - FORM_GOALS_BASELINE) / FORM_GOALS_DIVISOR
}

fn sample_normal_goals<R: Rng + ?Sized>(mean: f64, stddev: f64, rng: &mut R) -> u8 {
    let Ok(normal) = Normal::new(mean, stddev) else {
        return to_goals(mean);
    };
    to_goals(normal.sample(rng))
}

fn sample_poisson_goals<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> u8 {
    if lambda.is_nan() || lambda <= 0.0 {
        return 0;
    }
    match Poisson::new(lambda) {
        Ok(poisson) => to_goals(poisson.sample(rng)),
        Err(_) => 0,
    }
}

/// Truncates toward zero and floors at zero.
fn to_goals(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.trunc().clamp(0.0, f64::from(u8::MAX)) as u8
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::team::Ratings;

    fn stats(overall: i64) -> TeamStats {
        TeamStats::from_ratings(Ratings::new(overall, overall, overall))
    }

    #[test]
    fn level_names_fall_back_to_basic() {
        assert_eq!(SimLevel::from_name("rating"), SimLevel::Rating);
        assert_eq!(SimLevel::from_name(" Stats "), SimLevel::Stats);
        assert_eq!(SimLevel::from_name("realistic"), SimLevel::Realistic);
        assert_eq!(SimLevel::from_name("legendary"), SimLevel::Basic);
        assert_eq!(SimLevel::from(""), SimLevel::Basic);
    }

    #[test]
    fn basic_buckets_follow_strength_gap() {
        assert_eq!(basic_scorelines(21), VERY_STRONG_HOME);
        assert_eq!(basic_scorelines(20), STRONG_HOME);
        assert_eq!(basic_scorelines(10), EVEN);
        assert_eq!(basic_scorelines(-10), EVEN);
        assert_eq!(basic_scorelines(-11), STRONG_AWAY);
        assert_eq!(basic_scorelines(-21), VERY_STRONG_AWAY);
    }

    #[test]
    fn very_strong_home_never_loses_at_basic_level() {
        let sim = MatchSimulator::new(SimConfig {
            randomness: 0,
            ..SimConfig::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let (home, away) = (stats(90), stats(40));
            let r = sim.simulate("H", "A", Some(&home), Some(&away), SimLevel::Basic, 1, &mut rng);
            assert_eq!(r.outcome, Outcome::Home);
        }
    }

    #[test]
    fn fatigue_starts_after_gameweek_thirty() {
        let sim = MatchSimulator::default();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..200 {
            assert_eq!(sim.draw_swing(30, &mut rng).fatigue, 0);
        }
        let mut seen = std::collections::HashSet::new();
        for _ in 0..400 {
            let swing = sim.draw_swing(31, &mut rng);
            assert!((2..=5).contains(&swing.fatigue));
            assert!((-8..=8).contains(&swing.motivation));
            seen.insert(swing.fatigue);
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn fatigue_lowers_both_sides_equally() {
        let sim = MatchSimulator::default();
        let (home, away) = (stats(70), stats(60));
        let rested = Swing {
            fatigue: 0,
            motivation: 0,
        };
        let tired = Swing {
            fatigue: 4,
            motivation: 0,
        };
        let (h0, a0) = sim.stats_strengths(&home, &away, rested);
        let (h1, a1) = sim.stats_strengths(&home, &away, tired);
        assert_eq!(h0, 75.0);
        assert_eq!(a0, 60.0);
        assert_eq!(h0 - h1, 4.0);
        assert_eq!(a0 - a1, 4.0);
    }

    #[test]
    fn motivation_is_zero_sum() {
        let sim = MatchSimulator::default();
        let home = TeamStats {
            recent_form: 2.0,
            ..stats(70)
        };
        let away = stats(60);
        let calm = Swing {
            fatigue: 3,
            motivation: 0,
        };
        let (base_home, base_away) = sim.stats_strengths(&home, &away, calm);
        for motivation in -8..=8 {
            let (h, a) = sim.stats_strengths(&home, &away, Swing { motivation, ..calm });
            let home_delta = h - base_home;
            let away_delta = a - base_away;
            assert_eq!(home_delta, f64::from(motivation));
            assert_eq!(home_delta + away_delta, 0.0);
        }
    }

    #[test]
    fn goal_potential_is_floored() {
        assert_eq!(goal_potential(10, 100, 40.0), 0.0);
        assert!((goal_potential(80, 60, 50.0) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn zero_potential_never_scores() {
        let sim = MatchSimulator::default();
        let weak = TeamStats::from_ratings(Ratings::new(1, 1, 1));
        let wall = TeamStats::from_ratings(Ratings::new(100, 100, 100));
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            let r = sim.simulate("W", "X", Some(&weak), Some(&wall), SimLevel::Rating, 1, &mut rng);
            assert_eq!(r.home_goals, 0);
        }
    }

    #[test]
    fn form_multiplier_defaults_to_one() {
        assert_eq!(form_multiplier(&TeamStats::neutral()), 1.0);
        let hot = TeamStats {
            form_goals_last_5: Some(15),
            ..TeamStats::neutral()
        };
        assert_eq!(form_multiplier(&hot), 1.5);
    }

    #[test]
    fn to_goals_truncates_and_floors() {
        assert_eq!(to_goals(-0.7), 0);
        assert_eq!(to_goals(-3.0), 0);
        assert_eq!(to_goals(1.99), 1);
        assert_eq!(to_goals(f64::NAN), 0);
    }

    #[test]
    fn non_positive_lambda_scores_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(sample_poisson_goals(0.0, &mut rng), 0);
        assert_eq!(sample_poisson_goals(-1.0, &mut rng), 0);
    }

    #[test]
    fn estimator_ignores_level_and_uses_home_advantage() {
        let sim = MatchSimulator::default();
        // 50 + 5 - 50 = 5 lands in the (0, 10] bucket.
        let p = sim.win_draw_loss_probability(None, None);
        assert_eq!(p, probability_bucket(5));
        assert!((p.home - 0.45).abs() < 1e-12);
    }
}
