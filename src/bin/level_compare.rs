use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use season_sim::config::SimConfig;
use season_sim::match_sim::{MatchSimulator, SimLevel};
use season_sim::outcome::{ForecastScore, Outcome, OutcomeProbs};
use season_sim::setup::SeasonSetup;
use season_sim::team::TeamStats;

const DEFAULT_RUNS_PER_PAIR: usize = 20;
const DEFAULT_SEED: u64 = 2024;

struct LevelReport {
    level: SimLevel,
    observed: OutcomeProbs,
    goals_per_match: f64,
    score: ForecastScore,
}

fn main() -> Result<()> {
    let runs = parse_arg::<usize>("--runs")
        .unwrap_or(DEFAULT_RUNS_PER_PAIR)
        .clamp(1, 1000);
    let seed = parse_arg::<u64>("--seed").unwrap_or(DEFAULT_SEED);
    let setup = match parse_arg::<PathBuf>("--setup") {
        Some(path) => SeasonSetup::from_path(&path)?,
        None => SeasonSetup::builtin(),
    };

    let simulator = MatchSimulator::new(SimConfig::from_env());
    let stats: Vec<(String, TeamStats)> = setup
        .teams
        .iter()
        .map(|t| (t.name.clone(), TeamStats::from_ratings(t.ratings)))
        .collect();

    let mut pairs = Vec::new();
    for (i, home) in stats.iter().enumerate() {
        for (j, away) in stats.iter().enumerate() {
            if i != j {
                pairs.push((home, away));
            }
        }
    }
    if pairs.is_empty() {
        return Err(anyhow!("need at least two teams to compare levels"));
    }

    let predictions: Vec<OutcomeProbs> = pairs
        .iter()
        .map(|((_, h), (_, a))| simulator.win_draw_loss_probability(Some(h), Some(a)))
        .collect();

    let reports: Vec<LevelReport> = SimLevel::ALL
        .iter()
        .map(|&level| {
            let played: Vec<Vec<(Outcome, u32)>> = pairs
                .par_iter()
                .enumerate()
                .map(|(idx, ((home, hs), (away, aws)))| {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    rng.set_stream(idx as u64);
                    (0..runs)
                        .map(|_| {
                            let r = simulator
                                .simulate(home, away, Some(hs), Some(aws), level, 1, &mut rng);
                            (r.outcome, u32::from(r.home_goals) + u32::from(r.away_goals))
                        })
                        .collect()
                })
                .collect();

            let mut score = ForecastScore::default();
            let mut goals = 0u64;
            for (forecast, results) in predictions.iter().zip(&played) {
                for (actual, g) in results {
                    score.record(forecast, *actual);
                    goals += u64::from(*g);
                }
            }
            let outcomes = played.iter().flatten().map(|(o, _)| o);

            LevelReport {
                level,
                observed: OutcomeProbs::observed(outcomes),
                goals_per_match: goals as f64 / score.samples.max(1) as f64,
                score,
            }
        })
        .collect();

    println!("Estimator vs simulated outcomes");
    println!("teams={} pairs={} runs/pair={runs} seed={seed}", stats.len(), pairs.len());
    println!();
    for r in &reports {
        println!(
            "{:<10} H={:.3} D={:.3} A={:.3} goals={:.2} brier={:.4} ll={:.4} acc={:.3}",
            r.level.name(),
            r.observed.home,
            r.observed.draw,
            r.observed.away,
            r.goals_per_match,
            r.score.brier(),
            r.score.log_loss(),
            r.score.accuracy()
        );
    }
    Ok(())
}

/// Value of `--name value` or `--name=value`; unparseable values count as absent.
fn parse_arg<T: FromStr>(name: &str) -> Option<T> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let prefix = format!("{name}=");
    let raw = args.iter().enumerate().find_map(|(idx, arg)| {
        if let Some(inline) = arg.strip_prefix(&prefix) {
            Some(inline)
        } else if arg == name {
            args.get(idx + 1).map(String::as_str)
        } else {
            None
        }
    })?;
    raw.trim().parse().ok()
}
