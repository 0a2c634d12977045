use chrono::NaiveDate;
use log::info;

use crate::error::SeasonError;
use crate::fixture::{Fixture, FixtureId};
use crate::season::{self, Advanced, SeasonState};
use crate::standings::{self, StandingsRow};
use crate::team::{GoalTotals, Ratings, Team, TeamStats};

/// Read access to per-team simulation inputs, as of the last completed gameweek.
pub trait TeamStatsLookup {
    fn team_stats(&self, name: &str) -> Option<TeamStats>;
    fn team_names(&self) -> Vec<String>;
}

pub trait FixtureSource {
    /// Fixtures of one gameweek, user-team fixture first, then by home team.
    fn fixtures_for_gameweek(&self, gameweek: u32) -> Vec<Fixture>;
    fn all_fixtures(&self) -> &[Fixture];
    /// Overwrites the stored result; never accumulates.
    fn record_result(
        &mut self,
        id: FixtureId,
        home_goals: u8,
        away_goals: u8,
    ) -> Result<(), SeasonError>;
}

pub trait StandingsSink {
    /// Replaces the whole table.
    fn replace_standings(&mut self, rows: Vec<StandingsRow>);
}

pub(crate) mod sealed {
    /// Write access to the season clock. Unnameable outside the crate, so the
    /// guarded [`crate::season::advance`] is the only way to move it forward.
    pub trait SeasonClock {
        /// Moves the clock forward by one gameweek and returns the new value.
        fn commit_advance(&mut self) -> u32;
    }
}

/// Read access to the season clock.
///
/// ```compile_fail
/// use season_sim::store::{SeasonStateStore, SeasonStore};
///
/// let mut store = SeasonStore::default();
/// store.commit_advance();
/// ```
pub trait SeasonStateStore: sealed::SeasonClock {
    fn season_state(&self) -> &SeasonState;
}

/// In-memory season: teams, fixture calendar, derived table and season clock.
#[derive(Debug, Clone)]
pub struct SeasonStore {
    teams: Vec<Team>,
    fixtures: Vec<Fixture>,
    standings: Vec<StandingsRow>,
    state: SeasonState,
    next_fixture_id: FixtureId,
}

impl Default for SeasonStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SEASON_LABEL)
    }
}

impl SeasonStore {
    pub fn new(season_label: impl Into<String>) -> Self {
        Self {
            teams: Vec::new(),
            fixtures: Vec::new(),
            standings: Vec::new(),
            state: SeasonState::new(season_label),
            next_fixture_id: 1,
        }
    }

    pub fn add_team(&mut self, name: &str, ratings: Ratings) -> Result<(), SeasonError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SeasonError::UnknownTeam(name.to_string()));
        }
        if self.team(name).is_some() {
            return Err(SeasonError::DuplicateTeam(name.to_string()));
        }
        self.teams.push(Team::new(name, ratings));
        Ok(())
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn add_fixture(
        &mut self,
        gameweek: u32,
        home_team: &str,
        away_team: &str,
        date: Option<NaiveDate>,
    ) -> Result<FixtureId, SeasonError> {
        if gameweek == 0 {
            return Err(SeasonError::InvalidGameweek(gameweek));
        }
        for name in [home_team, away_team] {
            if self.team(name).is_none() {
                return Err(SeasonError::UnknownTeam(name.to_string()));
            }
        }
        if home_team == away_team {
            return Err(SeasonError::SameTeam(home_team.to_string()));
        }

        let id = self.next_fixture_id;
        self.next_fixture_id += 1;

        let mut fixture = Fixture::new(id, gameweek, home_team, away_team);
        fixture.date = date;
        fixture.is_user_team = self
            .state
            .user_team
            .as_deref()
            .is_some_and(|user| fixture.involves(user));
        self.fixtures.push(fixture);
        Ok(id)
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.id == id)
    }

    pub fn standings(&self) -> &[StandingsRow] {
        &self.standings
    }

    pub fn state(&self) -> &SeasonState {
        &self.state
    }

    /// Guarded gameweek transition; see [`season::advance`].
    pub fn advance(&mut self) -> Result<Advanced, SeasonError> {
        season::advance(self)
    }

    /// Makes `name` the user team and re-flags every fixture.
    pub fn assign_user_team(&mut self, name: &str) -> Result<(), SeasonError> {
        if self.team(name).is_none() {
            return Err(SeasonError::UnknownTeam(name.to_string()));
        }
        self.state.user_team = Some(name.to_string());
        for f in &mut self.fixtures {
            f.is_user_team = f.involves(name);
        }
        info!("user team is now {name}");
        Ok(())
    }

    /// Clears every result and rewinds the clock to gameweek 1.
    pub fn reset_season(&mut self) {
        for f in &mut self.fixtures {
            f.clear_result();
        }
        self.state.current_gameweek = 1;
        self.rebuild_derived();
        info!("season {} reset", self.state.season_label);
    }

    fn rebuild_derived(&mut self) {
        let names = self.team_names();
        let rows = standings::recompute_for(names.iter().map(String::as_str), &self.fixtures);
        self.replace_standings(rows);
    }
}

impl TeamStatsLookup for SeasonStore {
    fn team_stats(&self, name: &str) -> Option<TeamStats> {
        self.team(name)
            .map(|team| TeamStats::derive(team, &self.fixtures, self.state.current_gameweek))
    }

    fn team_names(&self) -> Vec<String> {
        self.teams.iter().map(|t| t.name.clone()).collect()
    }
}

impl FixtureSource for SeasonStore {
    fn fixtures_for_gameweek(&self, gameweek: u32) -> Vec<Fixture> {
        let mut out: Vec<Fixture> = self
            .fixtures
            .iter()
            .filter(|f| f.gameweek == gameweek)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.is_user_team
                .cmp(&a.is_user_team)
                .then_with(|| a.home_team.cmp(&b.home_team))
        });
        out
    }

    fn all_fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    fn record_result(
        &mut self,
        id: FixtureId,
        home_goals: u8,
        away_goals: u8,
    ) -> Result<(), SeasonError> {
        let fixture = self
            .fixtures
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(SeasonError::FixtureNotFound(id))?;
        fixture.set_result(home_goals, away_goals);
        Ok(())
    }
}

impl StandingsSink for SeasonStore {
    /// Team goal totals are derived data too, so they are refreshed from the
    /// same fixture snapshot as the table.
    fn replace_standings(&mut self, rows: Vec<StandingsRow>) {
        for team in &mut self.teams {
            team.totals = GoalTotals::tally(&team.name, &self.fixtures);
        }
        self.standings = rows;
    }
}

impl SeasonStateStore for SeasonStore {
    fn season_state(&self) -> &SeasonState {
        &self.state
    }
}

impl sealed::SeasonClock for SeasonStore {
    fn commit_advance(&mut self) -> u32 {
        self.state.current_gameweek += 1;
        self.state.current_gameweek
    }
}
