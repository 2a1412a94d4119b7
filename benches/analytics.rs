use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use roastline::analytics::{extract_milestones, rate_of_rise};
use roastline::chart::assemble_chart;
use roastline::config::AnalyticsConfig;
use roastline::model::{Event, MilestoneKind, Provenance, RoastId, TemperatureSample};

/// One sample per second with a noisy rise, plus milestone and control events
fn create_roast(seconds: usize) -> (Vec<TemperatureSample>, Vec<Event>) {
    let id = RoastId::new("bench").unwrap();
    let samples = (0..seconds)
        .map(|i| {
            let t = i as f64;
            let noise = ((i * 7919) % 13) as f64 * 0.05;
            TemperatureSample::new(
                id.clone(),
                t,
                Some(90.0 + 120.0 * (t / seconds as f64).powf(0.8) + noise),
                Some(230.0),
                Provenance::Live,
            )
        })
        .collect();

    let end = (seconds - 1) as f64;
    let mut events = vec![
        Event::milestone(id.clone(), MilestoneKind::Charge, 0.0, Provenance::Live),
        Event::milestone(id.clone(), MilestoneKind::DryEnd, end * 0.45, Provenance::Live),
        Event::milestone(id.clone(), MilestoneKind::FcStart, end * 0.8, Provenance::Live),
        Event::milestone(id.clone(), MilestoneKind::Drop, end, Provenance::Live),
    ];
    for step in 0..seconds / 30 {
        let t = (step * 30) as f64;
        events.push(Event::control(id.clone(), "fan", t, 0, (step % 9) as f64, Provenance::Live));
        events.push(Event::control(id.clone(), "heat", t + 5.0, 3, 40.0 + (step % 6) as f64 * 10.0, Provenance::Live));
    }
    events.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
    (samples, events)
}

/// Benchmark the smoothed rate-of-rise pipeline
fn bench_rate_of_rise(c: &mut Criterion) {
    let mut group = c.benchmark_group("rate_of_rise");
    let config = AnalyticsConfig::default();

    for seconds in [600, 1200, 3600] {
        let (samples, events) = create_roast(seconds);
        let milestones = extract_milestones(&events, &samples);
        group.throughput(Throughput::Elements(seconds as u64));
        group.bench_with_input(BenchmarkId::from_parameter(seconds), &samples, |b, samples| {
            b.iter(|| rate_of_rise(black_box(samples), &milestones, &config));
        });
    }

    group.finish();
}

/// Benchmark carry-forward chart assembly
fn bench_assemble_chart(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble_chart");
    let config = AnalyticsConfig::default();

    for seconds in [600, 1200, 3600] {
        let (samples, events) = create_roast(seconds);
        group.throughput(Throughput::Elements(seconds as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(seconds),
            &(samples, events),
            |b, (samples, events)| {
                b.iter(|| assemble_chart(black_box(samples), black_box(events), &config));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_rate_of_rise, bench_assemble_chart);
criterion_main!(benches);
