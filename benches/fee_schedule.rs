use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mountescrow_fees::fees::FeeSchedule;
use mountescrow_fees::money::Principal;
use rust_decimal::Decimal;

fn generate_amounts(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Spread across every tier, with a sprinkling of bad input.
            if i % 97 == 0 {
                "n/a".to_string()
            } else {
                format!("{}.{:02}", (i as u64).pow(3) % 3_000_000_000, i % 100)
            }
        })
        .collect()
}

fn bench_calculate(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate");
    let schedule = FeeSchedule::standard();

    for amount in [2_000i64, 3_000_000, 100_000_000, 2_000_000_000] {
        let principal = Principal::new(Decimal::from(amount)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(amount), &principal, |b, p| {
            b.iter(|| black_box(schedule.calculate(black_box(*p))));
        });
    }
    group.finish();
}

fn bench_quote_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("quote_many");
    let schedule = FeeSchedule::standard();

    for count in [100usize, 10_000] {
        let amounts = generate_amounts(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &amounts, |b, amounts| {
            b.iter(|| black_box(schedule.quote_many(amounts)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_calculate, bench_quote_many);
criterion_main!(benches);
