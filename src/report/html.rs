//! Embedded HTML pages: upload form and prediction results.

use crate::risk::{LabelCounts, PredictionResult, RiskLabel};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as _;

const HEAD: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1, shrink-to-fit=no">
    <title>Credit Risk Prediction API</title>
  </head>
  <body>
    <div style="text-align:center;">"#;

const TAIL: &str = r#"
    </div>
  </body>
</html>
"#;

const UPLOAD_FORM: &str = r#"
      <form method="POST" enctype="multipart/form-data">
        <input type="file" name="file" accept=".csv" required>
        <button type="submit">Upload and Predict</button>
      </form>"#;

/// Escape text for use in element content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Landing page served on GET.
pub fn render_upload_form() -> String {
    format!(
        "{HEAD}
      <h1>Welcome to Credit Risk Prediction API</h1>
      <p>Upload your CSV file to get Risk predictions.</p>{UPLOAD_FORM}{TAIL}"
    )
}

/// Result page: form, preview table, label summary and the embedded chart.
///
/// `preview` is already truncated by the caller; `counts` covers every scored row.
pub fn render_results(
    preview: &[PredictionResult],
    counts: &LabelCounts,
    chart_png_base64: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let mut rows = String::new();
    for r in preview {
        let _ = write!(
            rows,
            "
        <tr>
          <td>{}</td>
          <td>{}</td>
        </tr>",
            escape_html(&r.customer_id),
            r.risk_prediction
        );
    }

    let per_label = RiskLabel::ALL
        .iter()
        .map(|l| format!("{}: {}", l.caption(), counts.get(*l)))
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        r#"{HEAD}
      <h1>Credit Score Risk Prediction</h1>
      <p>Upload your CSV file to get Risk predictions.</p>{UPLOAD_FORM}

      <h3>Credit Risk Prediction (The 1st {shown} data)</h3>
      <table border="1" style="margin: 0 auto; width: 50%;">
        <tr>
          <th>Customer Id</th>
          <th>Credit Risk Prediction</th>
        </tr>{rows}
      </table>
      <p>Customers scored: {total} | {per_label}</p>
      <h2>Risk Prediction Plot</h2>
      <img src="data:image/png;base64,{chart_png_base64}" alt="Risk Prediction Plot">
      <p><small>Generated at {generated}</small></p>{TAIL}"#,
        shown = preview.len(),
        total = counts.total(),
        generated = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}
