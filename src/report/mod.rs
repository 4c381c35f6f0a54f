//! Result rendering: HTML pages and the embedded risk chart.

mod chart;
mod html;

pub use chart::{render_chart, ChartError};
pub use html::{escape_html, render_results, render_upload_form};

use crate::config::ReportConfig;
use crate::risk::{LabelCounts, PredictionResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};

/// Render the full result page for scored customers.
pub fn build_report(
    results: &[PredictionResult],
    config: &ReportConfig,
    generated_at: DateTime<Utc>,
) -> Result<String, ChartError> {
    let counts = LabelCounts::from_results(results);
    let png = render_chart(results, &counts, config.chart_width, config.chart_height)?;
    let preview = &results[..results.len().min(config.preview_rows)];
    Ok(render_results(preview, &counts, &BASE64.encode(png), generated_at))
}
