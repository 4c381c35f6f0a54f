//! Two-panel PNG chart: label distribution on top, per-customer scatter below.

use crate::risk::{LabelCounts, PredictionResult, RiskLabel};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::io::Cursor;
use std::sync::OnceLock;
use thiserror::Error;

const MIN_SIDE: u32 = 100;

/// Family name every text element of the chart resolves to.
const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
static FONT_READY: OnceLock<bool> = OnceLock::new();

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Chart size {width}x{height} too small; each side must be at least 100px")]
    Size { width: u32, height: u32 },

    #[error("Chart font could not be loaded")]
    Font,

    #[error("Chart drawing failed: {0}")]
    Draw(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn draw_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Register the bundled font with plotters. Runs once per process.
fn ensure_font() -> Result<(), ChartError> {
    let ready = *FONT_READY
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok());
    if ready {
        Ok(())
    } else {
        Err(ChartError::Font)
    }
}

/// X coordinates for the scatter: the ids themselves when all are numeric, else row positions.
fn x_positions(results: &[PredictionResult]) -> Vec<f64> {
    let numeric: Option<Vec<f64>> = results
        .iter()
        .map(|r| r.customer_id.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect();
    numeric.unwrap_or_else(|| (0..results.len()).map(|i| i as f64).collect())
}

fn padded_range(xs: &[f64]) -> (f64, f64) {
    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad, max + pad)
}

/// Render the chart as PNG bytes.
pub fn render_chart(
    results: &[PredictionResult],
    counts: &LabelCounts,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, ChartError> {
    if width < MIN_SIDE || height < MIN_SIDE {
        return Err(ChartError::Size { width, height });
    }
    ensure_font()?;

    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let (top, bottom) = root.split_vertically(height / 2);

        let max_count = counts.low.max(counts.high).max(1) as u32;
        let mut bars = ChartBuilder::on(&top)
            .caption("Distribution of Risk", (FONT_FAMILY, 20))
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(50)
            .build_cartesian_2d((0u32..1u32).into_segmented(), 0u32..(max_count + max_count / 10 + 1))
            .map_err(draw_err)?;
        bars.configure_mesh()
            .disable_x_mesh()
            .x_desc("Label")
            .y_desc("Count")
            .label_style((FONT_FAMILY, 12))
            .draw()
            .map_err(draw_err)?;
        bars.draw_series(
            Histogram::vertical(&bars)
                .style(BLUE.mix(0.7).filled())
                .margin(40)
                .data(
                    RiskLabel::ALL.map(|l| (u32::from(l.class()), counts.get(l) as u32)),
                ),
        )
        .map_err(draw_err)?;

        let xs = x_positions(results);
        let (x_min, x_max) = padded_range(&xs);
        let mut scatter = ChartBuilder::on(&bottom)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, -0.5f64..1.5f64)
            .map_err(draw_err)?;
        scatter
            .configure_mesh()
            .x_desc("CustomerId")
            .y_desc("Predicted Risk")
            .y_labels(3)
            .label_style((FONT_FAMILY, 12))
            .draw()
            .map_err(draw_err)?;

        let points: Vec<(f64, RiskLabel)> = xs
            .iter()
            .copied()
            .zip(results.iter().map(|r| r.risk_prediction))
            .collect();
        scatter
            .draw_series(
                points
                    .iter()
                    .filter(|(_, l)| *l == RiskLabel::Low)
                    .map(|&(x, _)| Circle::new((x, 0.0), 5, RED.filled())),
            )
            .map_err(draw_err)?
            .label(RiskLabel::Low.caption())
            .legend(|(x, y)| Circle::new((x, y), 5, RED.filled()));
        scatter
            .draw_series(
                points
                    .iter()
                    .filter(|(_, l)| *l == RiskLabel::High)
                    .map(|&(x, _)| Cross::new((x, 1.0), 6, GREEN.stroke_width(2))),
            )
            .map_err(draw_err)?
            .label(RiskLabel::High.caption())
            .legend(|(x, y)| Cross::new((x, y), 6, GREEN.stroke_width(2)));
        scatter
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font((FONT_FAMILY, 12))
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    let img = image::RgbImage::from_raw(width, height, buf)
        .ok_or(ChartError::Size { width, height })?;
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img).write_to(&mut out, image::ImageOutputFormat::Png)?;
    Ok(out.into_inner())
}
