use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use roastline::config::ImportConfig;
use roastline::literal::parse_document;
use roastline::model::{Provenance, RoastId};
use roastline::transform::transform_document;
use roastline::validator::validate_document;

/// Build a roast log in the loose literal syntax with `n` samples
fn create_roast_log(n: usize) -> String {
    let join = |values: Vec<String>| values.join(", ");
    let times = join((0..n).map(|i| format!("{:.2}", i as f64 * 0.75)).collect());
    let bean = join(
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                format!("{:.2}", 95.0 + 120.0 * t + if i % 97 == 0 { 0.4 } else { 0.0 })
            })
            .collect(),
    );
    let env = join((0..n).map(|i| format!("{:.2}", 230.0 + (i % 50) as f64 * 0.1)).collect());
    let extra = join((0..n).step_by(20).map(|i| format!("{}", 3 + (i / 200) % 6)).collect());
    let extra_times = join((0..n).step_by(20).map(|i| format!("{:.2}", i as f64 * 0.75)).collect());

    format!(
        "{{'title': 'Bench roast', 'roastertype': 'Drum', 'mode': 'F', 'flag': True,\n\
         # exported log\n\
         'timex': [{times},],\n 'temp2': [{bean}],\n 'temp1': [{env}],\n\
         'extratimex': [[{extra_times}]], 'extratemp1': [[{extra}]], 'extratemp2': [[{extra}]],\n\
         'extraname1': ['Fan'], 'extraname2': ['Drum speed'],\n\
         'timeindex': [1, {dry}, {fc}, 0, 0, 0, {drop}, 0], 'ambientTemp': None}}",
        dry = n * 4 / 10,
        fc = n * 8 / 10,
        drop = n - 2,
    )
}

/// Benchmark the tolerant parser alone
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_document");

    for samples in [600, 3000, 12000] {
        let text = create_roast_log(samples);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &text, |b, text| {
            b.iter(|| parse_document(black_box(text)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark validation and transformation of an already parsed document
fn bench_validate_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_transform");
    let roast_id = RoastId::new("bench").unwrap();
    let config = ImportConfig::default();

    for samples in [600, 3000, 12000] {
        let parsed = parse_document(&create_roast_log(samples)).unwrap();
        group.throughput(Throughput::Elements(samples as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &parsed.value, |b, doc| {
            b.iter(|| {
                let report = validate_document(black_box(doc), "bench");
                black_box(report);
                transform_document(doc, &roast_id, Provenance::Imported, &config).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_validate_transform);
criterion_main!(benches);
