// Fixture calendar generation for a league where every team meets every other
// team twice, once at each venue.

use chrono::{Duration, NaiveDate};

use crate::error::SeasonError;
use crate::fixture::FixtureId;
use crate::store::SeasonStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledFixture {
    pub gameweek: u32,
    pub home_team: String,
    pub away_team: String,
    pub date: Option<NaiveDate>,
}

/// Circle-method double round robin. An odd team count gets a bye each week.
/// The second half repeats the first with venues swapped.
pub fn double_round_robin(teams: &[String]) -> Vec<ScheduledFixture> {
    if teams.len() < 2 {
        return Vec::new();
    }

    let mut slots: Vec<Option<&str>> = teams.iter().map(|t| Some(t.as_str())).collect();
    if slots.len() % 2 != 0 {
        slots.push(None);
    }
    let n = slots.len();
    let rounds = n - 1;

    let mut first_half = Vec::new();
    for round in 0..rounds {
        let gameweek = round as u32 + 1;
        for i in 0..n / 2 {
            let (Some(a), Some(b)) = (slots[i], slots[n - 1 - i]) else {
                continue;
            };
            // Alternate venues so nobody plays a long home or away run; the
            // pinned slot flips every round.
            let swap = if i == 0 { round % 2 == 1 } else { i % 2 == 1 };
            let (home, away) = if swap { (b, a) } else { (a, b) };
            first_half.push(ScheduledFixture {
                gameweek,
                home_team: home.to_string(),
                away_team: away.to_string(),
                date: None,
            });
        }
        // Keep slot 0 pinned and rotate the rest clockwise.
        slots[1..].rotate_right(1);
    }

    let second_half: Vec<ScheduledFixture> = first_half
        .iter()
        .map(|f| ScheduledFixture {
            gameweek: f.gameweek + rounds as u32,
            home_team: f.away_team.clone(),
            away_team: f.home_team.clone(),
            date: None,
        })
        .collect();

    first_half.into_iter().chain(second_half).collect()
}

/// Assigns one date per gameweek, `days_between` apart, starting at `start`.
pub fn with_dates(
    mut fixtures: Vec<ScheduledFixture>,
    start: NaiveDate,
    days_between: i64,
) -> Vec<ScheduledFixture> {
    for f in &mut fixtures {
        let offset = i64::from(f.gameweek.saturating_sub(1)) * days_between;
        f.date = start.checked_add_signed(Duration::days(offset));
    }
    fixtures
}

pub fn load_into(
    store: &mut SeasonStore,
    fixtures: &[ScheduledFixture],
) -> Result<Vec<FixtureId>, SeasonError> {
    fixtures
        .iter()
        .map(|f| store.add_fixture(f.gameweek, &f.home_team, &f.away_team, f.date))
        .collect()
}
