/// Model fitting benchmarks
///
/// Measures OLS fitting and the full diagnostic battery as the number of
/// pairs grows. The blocked model has one parameter per pair, so its cost
/// grows with the cube of the pair count.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use maize_stats::data::{Column, Observation, ObservationTable, PlantType};
use maize_stats::diagnostics::{check_model, DiagnosticCheck, DiagnosticsConfig};
use maize_stats::model::{fit_with_blocked_factor, fit_with_factor};
use std::time::Duration;

/// Deterministic paired table with a small treatment effect
fn synthetic_table(pairs: u32) -> ObservationTable {
    let rows = (1..=pairs)
        .flat_map(|pair| {
            let base = 15.0 + f64::from(pair % 7) * 0.9;
            [
                Observation {
                    pair,
                    plant_type: PlantType::Cross,
                    height: base + 2.5 + f64::from(pair % 3) * 0.4,
                },
                Observation {
                    pair,
                    plant_type: PlantType::SelfFertilised,
                    height: base + f64::from(pair % 5) * 0.3,
                },
            ]
        })
        .collect();
    ObservationTable::new(rows)
}

fn bench_factor_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("factor_model");
    group.measurement_time(Duration::from_secs(5));

    for pairs in [15u32, 100, 1000].iter() {
        let table = synthetic_table(*pairs);
        group.throughput(Throughput::Elements(table.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pairs), &table, |b, table| {
            b.iter(|| fit_with_factor(black_box(table), Column::Type, "Cross"));
        });
    }
    group.finish();
}

fn bench_blocked_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocked_model");
    group.measurement_time(Duration::from_secs(5));

    for pairs in [15u32, 50, 100].iter() {
        let table = synthetic_table(*pairs);
        group.bench_with_input(BenchmarkId::from_parameter(pairs), &table, |b, table| {
            b.iter(|| fit_with_blocked_factor(black_box(table), Column::Type, "Cross", Column::Pair));
        });
    }
    group.finish();
}

fn bench_diagnostics(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnostics");
    group.measurement_time(Duration::from_secs(5));

    for pairs in [15u32, 100, 1000].iter() {
        let table = synthetic_table(*pairs);
        let model = match fit_with_factor(&table, Column::Type, "Cross") {
            Ok(model) => model,
            Err(e) => panic!("benchmark fixture failed to fit: {}", e),
        };
        let config = DiagnosticsConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(pairs), &model, |b, model| {
            b.iter(|| check_model(black_box(model), &DiagnosticCheck::ALL, &config));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_factor_model,
    bench_blocked_model,
    bench_diagnostics
);
criterion_main!(benches);
