//! Integration test: config load, model artifact load, CSV parse, score, join, render.

use credit_risk_api::{
    config::{ReportConfig, ServiceConfig},
    features::{parse_csv, required_columns, FEATURE_COLUMNS, FEATURE_DIM},
    model::{load_scorer, ForestModel, ModelError, Node, RiskScorer, Tree},
    risk::{attach_predictions, LabelCounts, RiskLabel},
    server::handlers::score_csv,
};
use chrono::Utc;
use ndarray::Array2;
use std::path::Path;

fn csv_with_rows(rows: &[(&str, f32)]) -> String {
    let mut out = required_columns().collect::<Vec<_>>().join(",");
    out.push('\n');
    for (id, stability) in rows {
        let mut cols = vec![id.to_string()];
        cols.extend((0..FEATURE_DIM - 1).map(|k| format!("{}", k + 1)));
        cols.push(stability.to_string());
        out.push_str(&cols.join(","));
        out.push('\n');
    }
    out
}

/// Stability <= 0.5 is high risk, otherwise low risk.
fn stability_forest() -> ForestModel {
    ForestModel {
        feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        n_classes: 2,
        trees: vec![Tree {
            nodes: vec![
                Node::Split {
                    feature: FEATURE_DIM - 1,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: vec![0.1, 0.9] },
                Node::Leaf { value: vec![0.9, 0.1] },
            ],
        }],
    }
}

struct FixedScorer(Vec<i64>);

impl RiskScorer for FixedScorer {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict(&self, _features: &Array2<f32>) -> Result<Vec<i64>, ModelError> {
        Ok(self.0.clone())
    }
}

#[test]
fn config_load_default() {
    let c = ServiceConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.server.port, 5000);
    assert_eq!(c.report.preview_rows, 10);
    assert!(c.log.json);
}

#[test]
fn config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"model_path":"models/risk_forest.json","report":{"preview_rows":5}}"#,
    )
    .unwrap();
    let c = ServiceConfig::load(&path);
    assert_eq!(c.model_path, Path::new("models/risk_forest.json"));
    assert_eq!(c.report.preview_rows, 5);
    assert_eq!(c.report.chart_width, 1500);
}

#[test]
fn invalid_config_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();
    let c = ServiceConfig::load(&path);
    assert_eq!(c.server.port, 5000);
}

#[test]
fn forest_artifact_scores_parsed_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("risk_forest.json");
    std::fs::write(&path, serde_json::to_string(&stability_forest()).unwrap()).unwrap();

    let scorer = load_scorer(&path).unwrap();
    assert_eq!(scorer.name(), "forest");

    let table = parse_csv(csv_with_rows(&[("1001", 0.9), ("1002", 0.2), ("1003", 0.5)]).as_bytes())
        .unwrap();
    let classes = scorer.predict(table.features()).unwrap();
    let results = attach_predictions(table.ids(), &classes).unwrap();

    let labels: Vec<_> = results.iter().map(|r| (r.customer_id.as_str(), r.risk_prediction)).collect();
    assert_eq!(
        labels,
        vec![
            ("1001", RiskLabel::Low),
            ("1002", RiskLabel::High),
            ("1003", RiskLabel::High),
        ]
    );
    assert_eq!(LabelCounts::from_results(&results), LabelCounts { low: 1, high: 2 });
}

#[test]
fn bundled_demo_model_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/risk_forest.json");
    let scorer = load_scorer(&path).unwrap();
    let table = parse_csv(csv_with_rows(&[("1", 0.1), ("2", 0.95)]).as_bytes()).unwrap();
    let classes = scorer.predict(table.features()).unwrap();
    assert_eq!(classes.len(), 2);
    assert!(classes.iter().all(|c| *c == 0 || *c == 1));
}

#[test]
fn forest_with_wrong_features_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    let mut model = stability_forest();
    model.feature_names.pop();
    std::fs::write(&path, serde_json::to_string(&model).unwrap()).unwrap();
    assert!(matches!(load_scorer(&path), Err(ModelError::Artifact(_))));
}

#[test]
fn two_customer_scenario_renders_expected_rows() {
    let scorer = FixedScorer(vec![0, 1]);
    let csv = csv_with_rows(&[("1001", 0.3), ("1002", 0.7)]);
    let page = score_csv(&scorer, csv.as_bytes(), &ReportConfig::default(), Utc::now()).unwrap();

    assert!(page.contains("<td>1001</td>\n          <td>0</td>"));
    assert!(page.contains("<td>1002</td>\n          <td>1</td>"));
    assert!(page.contains("Class 0 (Low Risk): 1 | Class 1 (High Risk): 1"));
    assert!(page.contains("data:image/png;base64,iVBORw0KGgo"));
}

#[test]
fn preview_is_capped_and_ordered() {
    let ids: Vec<String> = (0..25).map(|i| format!("{}", 5000 - i)).collect();
    let rows: Vec<(&str, f32)> = ids.iter().map(|id| (id.as_str(), 0.4)).collect();
    let scorer = FixedScorer(vec![1; 25]);
    let report = ReportConfig {
        chart_width: 400,
        chart_height: 300,
        ..ReportConfig::default()
    };
    let page = score_csv(&scorer, csv_with_rows(&rows).as_bytes(), &report, Utc::now()).unwrap();

    // header row + 10 data rows
    assert_eq!(page.matches("<tr>").count(), 11);
    let positions: Vec<usize> = ids[..10]
        .iter()
        .map(|id| page.find(&format!("<td>{id}</td>")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(!page.contains(&format!("<td>{}</td>", ids[10])));
    assert!(page.contains("Customers scored: 25"));
}

#[test]
fn scorer_returning_too_few_labels_is_an_error() {
    let scorer = FixedScorer(vec![0]);
    let csv = csv_with_rows(&[("1001", 0.3), ("1002", 0.7)]);
    let err = score_csv(&scorer, csv.as_bytes(), &ReportConfig::default(), Utc::now()).unwrap_err();
    assert_eq!(err.to_string(), "Model returned 1 predictions for 2 rows");
}
