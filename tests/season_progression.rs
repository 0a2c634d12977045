use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use season_sim::error::SeasonError;
use season_sim::match_sim::{MatchSimulator, SimLevel};
use season_sim::season::{self, GameweekStatus};
use season_sim::setup::SeasonSetup;
use season_sim::standings::position_of;
use season_sim::store::{FixtureSource, SeasonStore};
use season_sim::team::Ratings;

fn four_team_store() -> (SeasonStore, u64, u64) {
    let mut store = SeasonStore::new("2024-25");
    for team in ["Arsenal", "Chelsea", "Everton", "Fulham"] {
        store.add_team(team, Ratings::neutral()).unwrap();
    }
    let f1 = store.add_fixture(1, "Arsenal", "Chelsea", None).unwrap();
    let f2 = store.add_fixture(1, "Everton", "Fulham", None).unwrap();
    store.add_fixture(2, "Chelsea", "Everton", None).unwrap();
    store.add_fixture(2, "Fulham", "Arsenal", None).unwrap();
    (store, f1, f2)
}

fn play_out(store: &mut SeasonStore, level: SimLevel, seed: u64) {
    let sim = MatchSimulator::default();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let last = store
        .all_fixtures()
        .iter()
        .map(|f| f.gameweek)
        .max()
        .unwrap();
    while store.state().current_gameweek <= last {
        let gameweek = store.state().current_gameweek;
        if let Some(user) = store
            .fixtures_for_gameweek(gameweek)
            .into_iter()
            .find(|f| f.is_user_team && !f.is_played())
        {
            season::simulate_fixture(store, user.id, &sim, level, &mut rng).unwrap();
        }
        season::simulate_pending(store, &sim, level, seed).unwrap();
        store.advance().unwrap();
    }
}

#[test]
fn advance_is_refused_until_gameweek_is_complete() {
    let (mut store, f1, f2) = four_team_store();

    let err = store.advance().unwrap_err();
    assert_eq!(
        err,
        SeasonError::GameweekIncomplete {
            gameweek: 1,
            unplayed: 2
        }
    );

    store.record_result(f1, 2, 1).unwrap();
    let err = store.advance().unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(store.state().current_gameweek, 1);
    assert!(store.standings().is_empty());

    store.record_result(f2, 0, 0).unwrap();
    let advanced = store.advance().unwrap();
    assert_eq!(advanced.completed_gameweek, 1);
    assert_eq!(advanced.current_gameweek, 2);
    assert_eq!(store.state().current_gameweek, 2);

    let table = store.standings();
    let row = |team: &str| table.iter().find(|r| r.team == team).unwrap();
    assert_eq!(row("Arsenal").points, 3);
    assert_eq!(row("Arsenal").goal_difference, 1);
    assert_eq!(row("Chelsea").points, 0);
    assert_eq!(row("Chelsea").goal_difference, -1);
    assert_eq!(row("Everton").points, 1);
    assert_eq!(row("Everton").goal_difference, 0);
    assert_eq!(row("Fulham").points, 1);
    assert_eq!(row("Fulham").goal_difference, 0);
    assert_eq!(position_of(table, "Arsenal"), Some(1));
    assert_eq!(position_of(table, "Chelsea"), Some(4));
}

#[test]
fn clock_moves_only_through_advance_and_reset() {
    let (mut store, f1, f2) = four_team_store();
    let sim = MatchSimulator::default();
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    // Every other public write leaves the gameweek alone.
    store.assign_user_team("Everton").unwrap();
    assert!(season::simulate_pending(&mut store, &sim, SimLevel::Basic, 8).is_err());
    season::simulate_fixture(&mut store, f2, &sim, SimLevel::Basic, &mut rng).unwrap();
    store.record_result(f2, 1, 1).unwrap();
    assert!(store.advance().is_err());
    assert_eq!(store.state().current_gameweek, 1);
    assert!(store.standings().is_empty());

    season::simulate_pending(&mut store, &sim, SimLevel::Basic, 8).unwrap();
    assert!(store.fixture(f1).unwrap().is_played());
    assert_eq!(store.state().current_gameweek, 1);

    store.advance().unwrap();
    assert_eq!(store.state().current_gameweek, 2);
    assert_eq!(store.standings().len(), 4);

    store.reset_season();
    assert_eq!(store.state().current_gameweek, 1);
}

#[test]
fn status_reports_remaining_fixtures() {
    let (mut store, f1, f2) = four_team_store();
    store.record_result(f1, 1, 1).unwrap();
    assert_eq!(
        season::gameweek_status(&store),
        GameweekStatus::Open {
            gameweek: 1,
            unplayed: 1
        }
    );
    store.record_result(f2, 1, 1).unwrap();
    assert_eq!(season::gameweek_status(&store), GameweekStatus::Complete(1));
}

#[test]
fn standings_only_change_on_advance() {
    let (mut store, f1, f2) = four_team_store();
    store.record_result(f1, 1, 0).unwrap();
    store.record_result(f2, 1, 0).unwrap();
    store.advance().unwrap();
    let snapshot = store.standings().to_vec();

    let next = store.fixtures_for_gameweek(2);
    store.record_result(next[0].id, 5, 0).unwrap();
    assert_eq!(store.standings(), snapshot.as_slice());
}

#[test]
fn rerecording_a_result_replaces_it() {
    let (mut store, f1, f2) = four_team_store();
    store.record_result(f1, 4, 0).unwrap();
    store.record_result(f1, 0, 1).unwrap();
    store.record_result(f2, 2, 2).unwrap();
    store.advance().unwrap();
    let chelsea = store
        .standings()
        .iter()
        .find(|r| r.team == "Chelsea")
        .unwrap();
    assert_eq!(chelsea.points, 3);
    assert_eq!(chelsea.played, 1);
    assert_eq!(chelsea.goals_for, 1);
}

#[test]
fn user_match_gates_the_rest_of_the_gameweek() {
    let (mut store, f1, _) = four_team_store();
    store.assign_user_team("Chelsea").unwrap();
    let sim = MatchSimulator::default();

    let err = season::simulate_pending(&mut store, &sim, SimLevel::Realistic, 1).unwrap_err();
    assert_eq!(err, SeasonError::UserMatchPending { fixture_id: f1 });
    assert!(!store.fixture(f1).unwrap().is_played());

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    season::simulate_fixture(&mut store, f1, &sim, SimLevel::Realistic, &mut rng).unwrap();
    let others = season::simulate_pending(&mut store, &sim, SimLevel::Realistic, 1).unwrap();
    assert_eq!(others.len(), 1);
    assert!(store.advance().is_ok());
}

#[test]
fn seeded_seasons_are_reproducible() {
    for level in SimLevel::ALL {
        let build = || {
            SeasonSetup::builtin()
                .build_store("2024-25", "Sheffield United")
                .unwrap()
        };
        let mut a = build();
        let mut b = build();
        play_out(&mut a, level, 17);
        play_out(&mut b, level, 17);
        assert_eq!(a.standings(), b.standings(), "{level}");
        assert_eq!(a.all_fixtures(), b.all_fixtures(), "{level}");
    }
}

#[test]
fn full_season_produces_a_consistent_table() {
    let mut store = SeasonSetup::builtin()
        .build_store("2024-25", "Sheffield United")
        .unwrap();
    play_out(&mut store, SimLevel::Stats, 2025);

    assert_eq!(store.state().current_gameweek, 39);
    assert!(store.all_fixtures().iter().all(|f| f.is_played()));

    let table = store.standings();
    assert_eq!(table.len(), 20);
    for (idx, r) in table.iter().enumerate() {
        assert_eq!(r.position, idx + 1);
        assert_eq!(r.played, 38, "{}", r.team);
        assert_eq!(r.form.len(), 5);
    }
    for pair in table.windows(2) {
        assert!(pair[0].points >= pair[1].points);
    }

    let goals_for: u32 = table.iter().map(|r| r.goals_for).sum();
    let goals_against: u32 = table.iter().map(|r| r.goals_against).sum();
    assert_eq!(goals_for, goals_against);

    let decisive = store
        .all_fixtures()
        .iter()
        .filter(|f| f.home_goals() != f.away_goals())
        .count() as u32;
    let draws = 380 - decisive;
    let points: u32 = table.iter().map(|r| r.points).sum();
    assert_eq!(points, 3 * decisive + 2 * draws);

    for team in store.teams() {
        assert_eq!(team.totals.games_played(), 38, "{}", team.name);
    }
}

#[test]
fn reset_allows_a_replay() {
    let mut store = SeasonSetup::builtin()
        .build_store("2024-25", "Sheffield United")
        .unwrap();
    play_out(&mut store, SimLevel::Basic, 3);
    let first = store.standings().to_vec();

    store.reset_season();
    assert_eq!(store.state().current_gameweek, 1);
    assert!(store.all_fixtures().iter().all(|f| !f.is_played()));

    play_out(&mut store, SimLevel::Basic, 3);
    assert_eq!(store.standings(), first.as_slice());
}
