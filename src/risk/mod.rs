//! Risk labels and the keyed join of predictions onto customers.

mod engine;

pub use engine::{attach_predictions, LabelCounts, PredictionResult, RiskError, RiskLabel};
