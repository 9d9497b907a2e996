use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

use oddbet::fake_feed;
use oddbet::metrics::team_metrics;
use oddbet::parsing::parse_matches;
use oddbet::state::{SeasonState, ingest_text};
use oddbet::streaks::counter_alerts;

fn season_paste() -> Vec<String> {
    fake_feed::generate_season(&mut StdRng::seed_from_u64(42), 38)
}

fn bench_parse_round(c: &mut Criterion) {
    let round = fake_feed::generate_round(&mut StdRng::seed_from_u64(1), 1);
    c.bench_function("parse_round", |b| {
        b.iter(|| {
            let outcome = parse_matches(black_box(&round));
            black_box(outcome.matches.len());
        })
    });
}

fn bench_ingest_season(c: &mut Criterion) {
    let rounds = season_paste();
    c.bench_function("ingest_full_season", |b| {
        b.iter(|| {
            let mut state = SeasonState::default();
            for text in &rounds {
                ingest_text(&mut state, black_box(text));
            }
            black_box(state.history().len());
        })
    });
}

fn bench_analytics(c: &mut Criterion) {
    let mut state = SeasonState::default();
    for text in season_paste() {
        ingest_text(&mut state, &text);
    }
    c.bench_function("team_metrics", |b| {
        b.iter(|| black_box(team_metrics(black_box(&state)).len()))
    });
    c.bench_function("counter_alerts", |b| {
        b.iter(|| black_box(counter_alerts(black_box(&state)).len()))
    });
}

fn bench_parse_fixture(c: &mut Criterion) {
    c.bench_function("parse_week_paste", |b| {
        b.iter(|| {
            let outcome = parse_matches(black_box(WEEK_PASTE));
            black_box(outcome.matches.len());
        })
    });
}

criterion_group!(
    perf,
    bench_parse_round,
    bench_parse_fixture,
    bench_ingest_season,
    bench_analytics
);
criterion_main!(perf);

static WEEK_PASTE: &str = include_str!("../tests/fixtures/week_paste.txt");
