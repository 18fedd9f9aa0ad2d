use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use ipl_insights::dataset::InMemorySource;
use ipl_insights::demo_league::{self, DEMO_TEAMS};
use ipl_insights::export;
use ipl_insights::filter::SeasonFilter;
use ipl_insights::innings;
use ipl_insights::model::join_deliveries;
use ipl_insights::{analyze_head_to_head, analyze_team};

fn league() -> InMemorySource {
    demo_league::generate(2008, 6)
}

fn bench_team_insights(c: &mut Criterion) {
    let league = league();
    let season = SeasonFilter::AllSeasons;
    c.bench_function("team_insights_all_seasons", |b| {
        b.iter(|| {
            let insights = analyze_team(
                black_box(&league.matches),
                black_box(&league.deliveries),
                DEMO_TEAMS[0],
                &season,
            )
            .unwrap();
            black_box(insights.record.total_matches);
        })
    });
}

fn bench_head_to_head(c: &mut Criterion) {
    let league = league();
    let season = SeasonFilter::parse("2010");
    c.bench_function("head_to_head_from_2010", |b| {
        b.iter(|| {
            let insights = analyze_head_to_head(
                black_box(&league.matches),
                black_box(&league.deliveries),
                DEMO_TEAMS[1],
                DEMO_TEAMS[2],
                &season,
            )
            .unwrap();
            black_box(insights.record.total_matches_played);
        })
    });
}

fn bench_partition(c: &mut Criterion) {
    let league = league();
    let joined = join_deliveries(&league.matches, &league.deliveries);
    c.bench_function("innings_partition", |b| {
        b.iter(|| {
            let split = innings::partition(black_box(DEMO_TEAMS[3]), black_box(&joined));
            black_box(split.batting.len() + split.bowling.len());
        })
    });
}

fn bench_team_sheets(c: &mut Criterion) {
    let league = league();
    let insights = analyze_team(
        &league.matches,
        &league.deliveries,
        DEMO_TEAMS[4],
        &SeasonFilter::AllSeasons,
    )
    .unwrap();
    c.bench_function("team_sheets_build", |b| {
        b.iter(|| {
            let sheets = export::team_sheets(black_box(&insights));
            black_box(sheets.len());
        })
    });
}

criterion_group!(
    perf,
    bench_team_insights,
    bench_head_to_head,
    bench_partition,
    bench_team_sheets
);
criterion_main!(perf);
