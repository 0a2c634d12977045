use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::outcome::{Outcome, classify_outcome};

pub type FixtureId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub gameweek: u32,
    pub home_team: String,
    pub away_team: String,
    home_goals: Option<u8>,
    away_goals: Option<u8>,
    #[serde(default)]
    pub is_user_team: bool,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl Fixture {
    pub fn new(
        id: FixtureId,
        gameweek: u32,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
    ) -> Self {
        Self {
            id,
            gameweek,
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_goals: None,
            away_goals: None,
            is_user_team: false,
            date: None,
        }
    }

    /// Played iff both goal counts are present; the two are only ever set together.
    pub fn is_played(&self) -> bool {
        self.home_goals.is_some() && self.away_goals.is_some()
    }

    pub fn score(&self) -> Option<(u8, u8)> {
        Some((self.home_goals?, self.away_goals?))
    }

    pub fn home_goals(&self) -> Option<u8> {
        self.home_goals
    }

    pub fn away_goals(&self) -> Option<u8> {
        self.away_goals
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.score().map(|(h, a)| classify_outcome(h, a))
    }

    /// Overwrites any previous result.
    pub fn set_result(&mut self, home_goals: u8, away_goals: u8) {
        self.home_goals = Some(home_goals);
        self.away_goals = Some(away_goals);
    }

    pub fn clear_result(&mut self) {
        self.home_goals = None;
        self.away_goals = None;
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    pub fn scoreline(&self) -> Option<String> {
        self.score().map(|(h, a)| format!("{h}-{a}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_is_overwritten_not_accumulated() {
        let mut f = Fixture::new(1, 1, "A", "B");
        assert!(!f.is_played());
        assert_eq!(f.outcome(), None);

        f.set_result(2, 1);
        f.set_result(2, 1);
        assert_eq!(f.score(), Some((2, 1)));
        assert_eq!(f.outcome(), Some(Outcome::Home));

        f.set_result(0, 0);
        assert_eq!(f.scoreline().as_deref(), Some("0-0"));
    }

    #[test]
    fn clearing_returns_to_unplayed() {
        let mut f = Fixture::new(1, 1, "A", "B");
        f.set_result(1, 3);
        f.clear_result();
        assert!(!f.is_played());
        assert_eq!(f.home_goals(), None);
        assert_eq!(f.away_goals(), None);
    }
}
