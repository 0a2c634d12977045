use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

use season_sim::fixture::Fixture;
use season_sim::match_sim::{MatchSimulator, SimLevel};
use season_sim::season;
use season_sim::setup::SeasonSetup;
use season_sim::standings;
use season_sim::store::FixtureSource;
use season_sim::team::{Ratings, TeamStats};

fn played_season() -> Vec<Fixture> {
    let mut store = SeasonSetup::builtin()
        .build_store("2024-25", "Sheffield United")
        .expect("builtin setup");
    let sim = MatchSimulator::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let ids: Vec<u64> = store.all_fixtures().iter().map(|f| f.id).collect();
    for id in ids {
        season::simulate_fixture(&mut store, id, &sim, SimLevel::Realistic, &mut rng)
            .expect("known fixture");
    }
    store.all_fixtures().to_vec()
}

fn bench_simulate(c: &mut Criterion) {
    let sim = MatchSimulator::default();
    let home = TeamStats {
        recent_form: 2.0,
        goals_per_game_home: Some(2.1),
        conceded_per_game_home: Some(0.8),
        form_goals_last_5: Some(9),
        ..TeamStats::from_ratings(Ratings::new(88, 82, 85))
    };
    let away = TeamStats::from_ratings(Ratings::new(70, 75, 73));

    for level in SimLevel::ALL {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        c.bench_function(&format!("simulate_{level}"), |b| {
            b.iter(|| {
                black_box(sim.simulate(
                    "Liverpool",
                    "Newcastle United",
                    Some(black_box(&home)),
                    Some(black_box(&away)),
                    level,
                    black_box(34),
                    &mut rng,
                ))
            })
        });
    }
}

fn bench_recompute(c: &mut Criterion) {
    let fixtures = played_season();
    c.bench_function("recompute_full_season", |b| {
        b.iter(|| black_box(standings::recompute(black_box(&fixtures))))
    });
}

fn bench_full_season(c: &mut Criterion) {
    c.bench_function("play_full_season_stats", |b| {
        b.iter(|| {
            let mut store = SeasonSetup::builtin()
                .build_store("2024-25", "Sheffield United")
                .expect("builtin setup");
            let sim = MatchSimulator::default();
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            while store.state().current_gameweek <= 38 {
                let gameweek = store.state().current_gameweek;
                if let Some(user) = store
                    .fixtures_for_gameweek(gameweek)
                    .into_iter()
                    .find(|f| f.is_user_team)
                {
                    season::simulate_fixture(&mut store, user.id, &sim, SimLevel::Stats, &mut rng)
                        .expect("user fixture");
                }
                season::simulate_pending(&mut store, &sim, SimLevel::Stats, 3).expect("pending");
                store.advance().expect("complete gameweek");
            }
            black_box(store.standings().len())
        })
    });
}

criterion_group!(benches, bench_simulate, bench_recompute, bench_full_season);
criterion_main!(benches);
