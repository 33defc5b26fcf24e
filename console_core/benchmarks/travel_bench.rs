use std::sync::Arc;

use console_core::{ConsoleConfig, ConsoleIntent, ConsoleSession, SiteTravelCalculator};
use console_runtime::{ControlledDrone, ConsoleSnapshot, DroneStatus, SiteState};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn sites(count: usize) -> Vec<SiteState> {
    (0..count)
        .map(|index| SiteState {
            reference: format!("site-{index}"),
            name: format!("Site {index}"),
            distance: (index * 7 % 97) as f64 + 0.5,
            band_info: [("radiation".to_string(), index as f64 % 3.0)]
                .into_iter()
                .collect(),
            ..Default::default()
        })
        .collect()
}

fn exploring_snapshot(count: usize) -> ConsoleSnapshot {
    let sites = sites(count);
    ConsoleSnapshot {
        drone: Some(ControlledDrone {
            reference: "drone-1".into(),
            name: "Scout".into(),
            status: DroneStatus::Exploration,
            integrity: 80.0,
            max_integrity: 100.0,
            travel_coefficient: 1.5,
            log: Vec::new(),
        }),
        can_travel: true,
        site: sites.first().cloned(),
        sites,
        ..Default::default()
    }
}

fn bench_destinations(c: &mut Criterion) {
    let mut group = c.benchmark_group("travel_destinations");

    for count in [16usize, 128, 1024] {
        let listed = sites(count);
        group.bench_with_input(BenchmarkId::new("from_site", count), &count, |b, _| {
            let calculator = SiteTravelCalculator::new(1.5);
            b.iter(|| calculator.destinations(listed.first(), &listed));
        });

        group.bench_with_input(BenchmarkId::new("preview_view", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut session =
                        ConsoleSession::new("bench", Arc::new(ConsoleConfig::default()));
                    session.apply_snapshot(exploring_snapshot(count));
                    let _ = session.dispatch(ConsoleIntent::OpenTravelPreview);
                    session
                },
                |session| session.view(),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(travel_benches, bench_destinations);
criterion_main!(travel_benches);
