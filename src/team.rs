use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::fixture::Fixture;
use crate::outcome::Verdict;

pub const NEUTRAL_RATING: u8 = 50;
const MIN_RATING: i64 = 1;
const MAX_RATING: i64 = 100;
const FORM_WINDOW: usize = 5;

/// Attack/defense/overall strength, each in 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    #[serde(deserialize_with = "lenient_rating", default = "neutral")]
    pub attack: u8,
    #[serde(deserialize_with = "lenient_rating", default = "neutral")]
    pub defense: u8,
    #[serde(deserialize_with = "lenient_rating", default = "neutral")]
    pub overall: u8,
}

impl Default for Ratings {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Ratings {
    pub fn neutral() -> Self {
        Self {
            attack: NEUTRAL_RATING,
            defense: NEUTRAL_RATING,
            overall: NEUTRAL_RATING,
        }
    }

    /// Out-of-range values fall back to the neutral rating instead of failing.
    pub fn new(attack: i64, defense: i64, overall: i64) -> Self {
        Self {
            attack: coerce_rating(attack),
            defense: coerce_rating(defense),
            overall: coerce_rating(overall),
        }
    }
}

pub fn coerce_rating(raw: i64) -> u8 {
    if (MIN_RATING..=MAX_RATING).contains(&raw) {
        raw as u8
    } else {
        warn!("rating {raw} outside {MIN_RATING}..={MAX_RATING}, using {NEUTRAL_RATING}");
        NEUTRAL_RATING
    }
}

fn neutral() -> u8 {
    NEUTRAL_RATING
}

fn lenient_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    let parsed = match &v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(match parsed {
        Some(raw) => coerce_rating(raw),
        None => {
            warn!("non-numeric rating {v}, using {NEUTRAL_RATING}");
            NEUTRAL_RATING
        }
    })
}

/// Cumulative goal record, split by venue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTotals {
    pub scored_home: u32,
    pub scored_away: u32,
    pub conceded_home: u32,
    pub conceded_away: u32,
    pub games_home: u32,
    pub games_away: u32,
}

impl GoalTotals {
    pub fn tally<'a, I>(team: &str, fixtures: I) -> Self
    where
        I: IntoIterator<Item = &'a Fixture>,
    {
        let mut out = Self::default();
        for f in fixtures {
            let Some((home_goals, away_goals)) = f.score() else {
                continue;
            };
            if f.home_team == team {
                out.games_home += 1;
                out.scored_home += u32::from(home_goals);
                out.conceded_home += u32::from(away_goals);
            } else if f.away_team == team {
                out.games_away += 1;
                out.scored_away += u32::from(away_goals);
                out.conceded_away += u32::from(home_goals);
            }
        }
        out
    }

    pub fn goals_scored(&self) -> u32 {
        self.scored_home + self.scored_away
    }

    pub fn goals_conceded(&self) -> u32 {
        self.conceded_home + self.conceded_away
    }

    pub fn games_played(&self) -> u32 {
        self.games_home + self.games_away
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    #[serde(flatten)]
    pub ratings: Ratings,
    #[serde(default)]
    pub totals: GoalTotals,
}

impl Team {
    pub fn new(name: impl Into<String>, ratings: Ratings) -> Self {
        Self {
            name: name.into(),
            ratings,
            totals: GoalTotals::default(),
        }
    }
}

/// Everything the simulator may consult about one side.
///
/// Only `ratings` is required; the optional rates are filled in once a team
/// has played at the relevant venue and each simulation level substitutes its
/// own default when they are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub ratings: Ratings,
    /// Net result trend over the last five games: +1 per win, -1 per loss.
    pub recent_form: f64,
    pub goals_per_game_home: Option<f64>,
    pub conceded_per_game_home: Option<f64>,
    pub goals_per_game_away: Option<f64>,
    pub conceded_per_game_away: Option<f64>,
    pub form_goals_last_5: Option<u32>,
}

impl TeamStats {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn from_ratings(ratings: Ratings) -> Self {
        Self {
            ratings,
            ..Self::default()
        }
    }

    /// Derives scoring rates and form from fixtures played before `before_gameweek`.
    ///
    /// Rates and form read the same snapshot, so results recorded in the
    /// gameweek being played do not leak into either until it is complete.
    pub fn derive(team: &Team, fixtures: &[Fixture], before_gameweek: u32) -> Self {
        let snapshot = || fixtures.iter().filter(move |f| f.gameweek < before_gameweek);
        let totals = GoalTotals::tally(&team.name, snapshot());
        let recent = recent_results(&team.name, snapshot(), FORM_WINDOW);

        let recent_form = recent.iter().map(|(verdict, _)| verdict.trend()).sum();
        let form_goals_last_5 = if recent.is_empty() {
            None
        } else {
            Some(recent.iter().map(|(_, goals)| u32::from(*goals)).sum())
        };

        Self {
            ratings: team.ratings,
            recent_form,
            goals_per_game_home: per_game(totals.scored_home, totals.games_home),
            conceded_per_game_home: per_game(totals.conceded_home, totals.games_home),
            goals_per_game_away: per_game(totals.scored_away, totals.games_away),
            conceded_per_game_away: per_game(totals.conceded_away, totals.games_away),
            form_goals_last_5,
        }
    }
}

fn per_game(goals: u32, games: u32) -> Option<f64> {
    if games == 0 {
        None
    } else {
        Some(f64::from(goals) / f64::from(games))
    }
}

/// Last `n` results for `team` in gameweek order, most recent last, each with
/// the goals the team scored.
pub(crate) fn recent_results<'a, I>(team: &str, fixtures: I, n: usize) -> Vec<(Verdict, u8)>
where
    I: IntoIterator<Item = &'a Fixture>,
{
    let mut played: Vec<&Fixture> = fixtures
        .into_iter()
        .filter(|f| f.is_played() && f.involves(team))
        .collect();
    played.sort_by_key(|f| f.gameweek);

    let skip = played.len().saturating_sub(n);
    played
        .into_iter()
        .skip(skip)
        .filter_map(|f| {
            let (home_goals, away_goals) = f.score()?;
            let (gf, ga) = if f.home_team == team {
                (home_goals, away_goals)
            } else {
                (away_goals, home_goals)
            };
            Some((Verdict::from_goals(gf, ga), gf))
        })
        .collect()
}
