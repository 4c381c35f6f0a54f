//! Pipeline benchmark: CSV bytes → parse → score → join → report.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use credit_risk_api::config::ReportConfig;
use credit_risk_api::features::{parse_csv, required_columns, FEATURE_DIM};
use credit_risk_api::model::{ForestScorer, RiskScorer};
use credit_risk_api::risk::attach_predictions;
use credit_risk_api::server::handlers::score_csv;
use std::path::Path;

fn make_csv(rows: usize) -> Vec<u8> {
    let mut out = required_columns().collect::<Vec<_>>().join(",");
    for i in 0..rows {
        out.push('\n');
        out.push_str(&(10_000 + i).to_string());
        for k in 0..FEATURE_DIM {
            out.push_str(&format!(",{}", (i + k) % 97));
        }
    }
    out.push('\n');
    out.into_bytes()
}

fn demo_scorer() -> ForestScorer {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/risk_forest.json");
    ForestScorer::load(&path).unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let data = make_csv(1_000);
    c.bench_function("parse_csv_1000_rows", |b| {
        b.iter(|| parse_csv(black_box(&data)).unwrap())
    });
}

fn bench_parse_score_join(c: &mut Criterion) {
    let data = make_csv(1_000);
    let scorer = demo_scorer();
    c.bench_function("parse_score_join_1000_rows", |b| {
        b.iter(|| {
            let table = parse_csv(black_box(&data)).unwrap();
            let classes = scorer.predict(table.features()).unwrap();
            black_box(attach_predictions(table.ids(), &classes).unwrap())
        })
    });
}

fn bench_full_report(c: &mut Criterion) {
    let data = make_csv(200);
    let scorer = demo_scorer();
    let report = ReportConfig::default();
    c.bench_function("full_report_200_rows", |b| {
        b.iter(|| black_box(score_csv(&scorer, &data, &report, Utc::now()).unwrap()))
    });
}

criterion_group!(benches, bench_parse, bench_parse_score_join, bench_full_report);
criterion_main!(benches);
