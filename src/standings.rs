use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fixture::Fixture;
use crate::outcome::Verdict;

const FORM_LENGTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub position: usize,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    /// Last five results, oldest first, e.g. `"WWDLW"`.
    pub form: String,
}

impl StandingsRow {
    pub fn new(team: impl Into<String>) -> Self {
        Self {
            position: 0,
            team: team.into(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            form: String::new(),
        }
    }

    fn apply(&mut self, goals_for: u8, goals_against: u8) {
        let verdict = Verdict::from_goals(goals_for, goals_against);
        self.played += 1;
        match verdict {
            Verdict::Win => self.won += 1,
            Verdict::Draw => self.drawn += 1,
            Verdict::Loss => self.lost += 1,
        }
        self.points += verdict.points();
        self.goals_for += u32::from(goals_for);
        self.goals_against += u32::from(goals_against);
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;

        self.form.push(verdict.letter());
        if self.form.len() > FORM_LENGTH {
            self.form.remove(0);
        }
    }
}

/// Builds the full league table from scratch.
///
/// Every team named by any fixture gets a row, in order of first appearance;
/// only played fixtures contribute results.
pub fn recompute(fixtures: &[Fixture]) -> Vec<StandingsRow> {
    recompute_for(std::iter::empty::<&str>(), fixtures)
}

/// Like [`recompute`], but seeds rows from `teams` first so that sides
/// without fixtures still appear in the table.
pub fn recompute_for<'a, I>(teams: I, fixtures: &[Fixture]) -> Vec<StandingsRow>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut rows: Vec<StandingsRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut ensure_row = |name: &str, rows: &mut Vec<StandingsRow>| -> usize {
        if let Some(&idx) = index.get(name) {
            return idx;
        }
        rows.push(StandingsRow::new(name));
        index.insert(name.to_string(), rows.len() - 1);
        rows.len() - 1
    };

    for team in teams {
        ensure_row(team, &mut rows);
    }
    for f in fixtures {
        ensure_row(f.home_team.as_str(), &mut rows);
        ensure_row(f.away_team.as_str(), &mut rows);
    }

    let mut played: Vec<&Fixture> = fixtures.iter().filter(|f| f.is_played()).collect();
    played.sort_by_key(|f| f.gameweek);

    for f in played {
        let Some((home_goals, away_goals)) = f.score() else {
            continue;
        };
        let home = ensure_row(f.home_team.as_str(), &mut rows);
        rows[home].apply(home_goals, away_goals);
        let away = ensure_row(f.away_team.as_str(), &mut rows);
        rows[away].apply(away_goals, home_goals);
    }

    sort_rows(&mut rows);
    rows
}

/// Stable sort by points, then goal difference, then goals scored; assigns positions.
pub fn sort_rows(rows: &mut [StandingsRow]) {
    rows.sort_by(compare_rows);
    for (idx, row) in rows.iter_mut().enumerate() {
        row.position = idx + 1;
    }
}

fn compare_rows(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
}

pub fn position_of(rows: &[StandingsRow], team: &str) -> Option<usize> {
    rows.iter().find(|r| r.team == team).map(|r| r.position)
}
