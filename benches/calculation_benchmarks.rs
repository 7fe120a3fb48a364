//! Performance benchmarks for the Finance Suite calculators.
//!
//! Covers the pure engines (income tax, gross-to-net, the 25-step
//! net-to-gross bisection, tariff estimate and breakdown) and one HTTP
//! round trip through the router.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;

use finance_suite::api::{create_router, AppState};
use finance_suite::calculation::{
    calculate_tarif, gross_to_net, income_tax, monthly_breakdown, net_to_gross,
};
use finance_suite::config::ConfigLoader;
use finance_suite::models::{PayrollInput, TarifInput};
use finance_suite::store::Database;
use finance_suite::tasks::TaskQueue;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/de2025").expect("Failed to load config")
}

/// Benchmark: income tax across all zones.
fn bench_income_tax(c: &mut Criterion) {
    let mut group = c.benchmark_group("income_tax");

    for income in [10_000i64, 15_000, 40_000, 100_000, 300_000] {
        group.bench_with_input(BenchmarkId::new("zve", income), &income, |b, &income| {
            let zve = Decimal::from(income);
            b.iter(|| income_tax(black_box(zve)))
        });
    }

    group.finish();
}

/// Benchmark: payroll in both directions.
fn bench_payroll(c: &mut Criterion) {
    let config = load_config();
    let payroll = config.payroll();
    let input = PayrollInput::new(Decimal::from(4000));

    c.bench_function("gross_to_net", |b| {
        b.iter(|| gross_to_net(black_box(&input), payroll).unwrap())
    });

    let target = PayrollInput::new(Decimal::from(3000));
    c.bench_function("net_to_gross", |b| {
        b.iter(|| net_to_gross(black_box(&target), payroll).unwrap())
    });
}

/// Benchmark: tariff estimate for every wage group.
fn bench_tarif(c: &mut Criterion) {
    let config = load_config();
    let tarif = config.tarif();

    let mut group = c.benchmark_group("tarif");
    let inputs: Vec<TarifInput> = (1..=11)
        .map(|n| TarifInput::new(format!("EG {n}"), "Grundentgelt"))
        .collect();
    group.throughput(Throughput::Elements(inputs.len() as u64));
    group.bench_function("estimate_all_groups", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(calculate_tarif(input, tarif).unwrap());
            }
        })
    });

    let input = TarifInput::new("EG 8", "Grundentgelt");
    group.bench_function("monthly_breakdown", |b| {
        b.iter(|| monthly_breakdown(black_box(&input), tarif).unwrap())
    });

    group.finish();
}

/// Benchmark: one gross-to-net request through the router.
fn bench_http_gross_to_net(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = rt.block_on(async {
        let database = Database::connect_in_memory()
            .await
            .expect("Failed to open database");
        let (tasks, _worker) = TaskQueue::spawn(database.clone(), 1024);
        create_router(AppState::new(load_config(), database, tasks), "/api")
    });
    let body = serde_json::json!({ "gross": "4000", "tax_class": 1 }).to_string();

    c.bench_function("http_gross_to_net", |b| {
        b.to_async(&rt).iter(|| async {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/payroll/gross-to-net")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_income_tax,
    bench_payroll,
    bench_tarif,
    bench_http_gross_to_net,
);
criterion_main!(benches);
