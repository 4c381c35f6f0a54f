//! Credit risk prediction service.
//!
//! Modular structure:
//! - [`features`] — Seventeen-column upload schema and CSV parsing
//! - [`model`] — Pre-trained classifier behind the [`RiskScorer`] trait (ONNX or JSON forest)
//! - [`risk`] — Risk labels and the keyed join of predictions onto customers
//! - [`report`] — HTML pages and the embedded PNG chart
//! - [`server`] — axum routes, handlers and error mapping
//! - [`logging`] — Structured JSON logging

pub mod config;
pub mod features;
pub mod model;
pub mod risk;
pub mod report;
pub mod server;
pub mod logging;

pub use config::ServiceConfig;
pub use features::{FeatureTable, parse_csv};
pub use model::{RiskScorer, load_scorer};
pub use risk::{PredictionResult, RiskLabel};
pub use server::{AppState, create_router};
pub use logging::StructuredLogger;
