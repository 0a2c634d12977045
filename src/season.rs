use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SeasonError;
use crate::fixture::{Fixture, FixtureId};
use crate::match_sim::{MatchResult, MatchSimulator, SimLevel};
use crate::standings::{self, StandingsRow};
use crate::store::sealed::SeasonClock;
use crate::store::{FixtureSource, SeasonStateStore, StandingsSink, TeamStatsLookup};
use crate::team::TeamStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonState {
    pub current_gameweek: u32,
    pub season_label: String,
    pub user_team: Option<String>,
}

impl SeasonState {
    pub fn new(season_label: impl Into<String>) -> Self {
        Self {
            current_gameweek: 1,
            season_label: season_label.into(),
            user_team: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameweekStatus {
    /// Some fixtures of the gameweek are still unplayed.
    Open { gameweek: u32, unplayed: usize },
    Complete(u32),
}

impl GameweekStatus {
    pub fn gameweek(&self) -> u32 {
        match self {
            GameweekStatus::Open { gameweek, .. } => *gameweek,
            GameweekStatus::Complete(gameweek) => *gameweek,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, GameweekStatus::Complete(_))
    }
}

/// What a successful [`advance`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advanced {
    pub completed_gameweek: u32,
    pub current_gameweek: u32,
    pub standings: Vec<StandingsRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedFixture {
    pub fixture_id: FixtureId,
    pub result: MatchResult,
}

pub fn gameweek_status<S>(store: &S) -> GameweekStatus
where
    S: FixtureSource + SeasonStateStore + ?Sized,
{
    let gameweek = store.season_state().current_gameweek;
    let unplayed = store
        .all_fixtures()
        .iter()
        .filter(|f| f.gameweek == gameweek && !f.is_played())
        .count();
    if unplayed == 0 {
        GameweekStatus::Complete(gameweek)
    } else {
        GameweekStatus::Open { gameweek, unplayed }
    }
}

/// Moves to the next gameweek once every fixture of the current one is played.
///
/// The table is rebuilt from the full fixture set before the clock moves, so
/// callers never observe a new gameweek with a stale table.
pub fn advance<S>(store: &mut S) -> Result<Advanced, SeasonError>
where
    S: FixtureSource + StandingsSink + SeasonStateStore + TeamStatsLookup + ?Sized,
{
    let completed = match gameweek_status(&*store) {
        GameweekStatus::Open { gameweek, unplayed } => {
            return Err(SeasonError::GameweekIncomplete { gameweek, unplayed });
        }
        GameweekStatus::Complete(gameweek) => gameweek,
    };

    if !store
        .all_fixtures()
        .iter()
        .any(|f| f.gameweek == completed)
    {
        warn!("gameweek {completed} has no fixtures, advancing anyway");
    }

    let names = store.team_names();
    let table = standings::recompute_for(names.iter().map(String::as_str), store.all_fixtures());
    store.replace_standings(table.clone());
    let current = store.commit_advance();

    info!("gameweek {completed} complete, now on gameweek {current}");
    if let Some(leader) = table.first() {
        info!("leader: {} ({} pts)", leader.team, leader.points);
    }

    Ok(Advanced {
        completed_gameweek: completed,
        current_gameweek: current,
        standings: table,
    })
}

/// Simulates one unplayed fixture with the caller's RNG and records the result.
/// A fixture that already has a result is refused; use
/// [`FixtureSource::record_result`] to correct one.
pub fn simulate_fixture<S, R>(
    store: &mut S,
    fixture_id: FixtureId,
    simulator: &MatchSimulator,
    level: SimLevel,
    rng: &mut R,
) -> Result<MatchResult, SeasonError>
where
    S: FixtureSource + TeamStatsLookup + ?Sized,
    R: Rng + ?Sized,
{
    let fixture = store
        .all_fixtures()
        .iter()
        .find(|f| f.id == fixture_id)
        .cloned()
        .ok_or(SeasonError::FixtureNotFound(fixture_id))?;
    if fixture.is_played() {
        return Err(SeasonError::FixtureAlreadyPlayed(fixture_id));
    }

    let home = store.team_stats(&fixture.home_team);
    let away = store.team_stats(&fixture.away_team);
    let result = simulator.simulate(
        &fixture.home_team,
        &fixture.away_team,
        home.as_ref(),
        away.as_ref(),
        level,
        fixture.gameweek,
        rng,
    );
    store.record_result(fixture_id, result.home_goals, result.away_goals)?;
    Ok(result)
}

/// Simulates every unplayed fixture of the current gameweek except the user's.
///
/// Refused while the user team's fixture is still unplayed. Each fixture draws
/// from its own ChaCha stream (seed, fixture id), so the outcome does not
/// depend on how rayon schedules the work.
pub fn simulate_pending<S>(
    store: &mut S,
    simulator: &MatchSimulator,
    level: SimLevel,
    seed: u64,
) -> Result<Vec<SimulatedFixture>, SeasonError>
where
    S: FixtureSource + TeamStatsLookup + SeasonStateStore + ?Sized,
{
    let gameweek = store.season_state().current_gameweek;
    let fixtures = store.fixtures_for_gameweek(gameweek);

    if let Some(user) = fixtures.iter().find(|f| f.is_user_team && !f.is_played()) {
        return Err(SeasonError::UserMatchPending {
            fixture_id: user.id,
        });
    }

    let jobs: Vec<(Fixture, Option<TeamStats>, Option<TeamStats>)> = fixtures
        .into_iter()
        .filter(|f| !f.is_played())
        .map(|f| {
            let home = store.team_stats(&f.home_team);
            let away = store.team_stats(&f.away_team);
            (f, home, away)
        })
        .collect();

    let simulated: Vec<SimulatedFixture> = jobs
        .par_iter()
        .map(|(fixture, home, away)| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(fixture.id);
            let result = simulator.simulate(
                &fixture.home_team,
                &fixture.away_team,
                home.as_ref(),
                away.as_ref(),
                level,
                fixture.gameweek,
                &mut rng,
            );
            SimulatedFixture {
                fixture_id: fixture.id,
                result,
            }
        })
        .collect();

    for s in &simulated {
        store.record_result(s.fixture_id, s.result.home_goals, s.result.away_goals)?;
    }
    debug!(
        "simulated {} fixture(s) in gameweek {gameweek} at {level} level",
        simulated.len()
    );
    Ok(simulated)
}
