use std::path::PathBuf;

use anyhow::{Context, Result};
use env_logger::Env;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use season_sim::config::RunConfig;
use season_sim::match_sim::{MatchSimulator, SimLevel};
use season_sim::season::{self, SimulatedFixture};
use season_sim::setup::SeasonSetup;
use season_sim::standings::StandingsRow;
use season_sim::store::{FixtureSource, SeasonStore};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut cfg = RunConfig::load();
    if let Some(level) = parse_str_arg("--level") {
        cfg.level = SimLevel::from_name(&level);
    }
    if let Some(seed) = parse_u64_arg("--seed") {
        cfg.seed = Some(seed);
    }
    if let Some(path) = parse_str_arg("--setup") {
        cfg.setup_path = Some(PathBuf::from(path));
    }
    if let Some(team) = parse_str_arg("--user-team") {
        cfg.user_team = team;
    }
    let stop_after = parse_u64_arg("--gameweeks").map(|n| n as u32);
    let as_json = has_flag("--json");

    let setup = match &cfg.setup_path {
        Some(path) => SeasonSetup::from_path(path)?,
        None => SeasonSetup::builtin(),
    };
    let mut store = setup.build_store(&cfg.season_label, &cfg.user_team)?;

    let seed = cfg.seed.unwrap_or_else(rand::random);
    info!("level={} seed={seed}", cfg.level);

    let simulator = MatchSimulator::new(cfg.sim);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let last_gameweek = store
        .all_fixtures()
        .iter()
        .map(|f| f.gameweek)
        .max()
        .context("season has no fixtures")?;
    let last_gameweek = stop_after.map_or(last_gameweek, |n| n.min(last_gameweek));

    while store.state().current_gameweek <= last_gameweek {
        play_gameweek(&mut store, &simulator, cfg.level, seed, &mut rng)?;
        store.advance()?;
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(store.standings())?);
    } else {
        println!();
        println!(
            "{} after gameweek {} ({} level, seed {seed})",
            store.state().season_label,
            store.state().current_gameweek - 1,
            cfg.level
        );
        print_table(store.standings(), store.state().user_team.as_deref());
    }
    Ok(())
}

/// The user's fixture is played first, then the rest of the gameweek.
fn play_gameweek(
    store: &mut SeasonStore,
    simulator: &MatchSimulator,
    level: SimLevel,
    seed: u64,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    let gameweek = store.state().current_gameweek;
    let user_fixture = store
        .fixtures_for_gameweek(gameweek)
        .into_iter()
        .find(|f| f.is_user_team && !f.is_played());

    if let Some(fixture) = user_fixture {
        let result = season::simulate_fixture(store, fixture.id, simulator, level, rng)
            .with_context(|| format!("simulate user fixture {}", fixture.id))?;
        println!("GW{gameweek:>2}  {result}");
    }

    let others: Vec<SimulatedFixture> = season::simulate_pending(store, simulator, level, seed)?;
    info!("gameweek {gameweek}: {} other fixture(s) played", others.len());
    Ok(())
}

fn print_table(rows: &[StandingsRow], user_team: Option<&str>) {
    println!(
        "{:>3}  {:<22} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}  {}",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts", "Form"
    );
    for r in rows {
        let marker = if Some(r.team.as_str()) == user_team { "*" } else { " " };
        println!(
            "{:>3}{marker} {:<22} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+4} {:>4}  {}",
            r.position,
            r.team,
            r.played,
            r.won,
            r.drawn,
            r.lost,
            r.goals_for,
            r.goals_against,
            r.goal_difference,
            r.points,
            r.form
        );
    }
}

fn parse_str_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && !raw.trim().is_empty()
        {
            return Some(raw.trim().to_string());
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    parse_str_arg(name).and_then(|raw| raw.parse::<u64>().ok())
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}
