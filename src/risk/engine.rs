//! Maps raw classifier output to risk labels and joins them back onto customers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Model returned {got} predictions for {expected} rows")]
    CountMismatch { expected: usize, got: usize },

    #[error("Model returned unknown class {0}; expected 0 or 1")]
    UnknownClass(i64),

    #[error("CustomerId '{0}' appears more than once")]
    DuplicateId(String),
}

/// Binary risk label. Serialized as its class number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    pub const ALL: [RiskLabel; 2] = [RiskLabel::Low, RiskLabel::High];

    pub fn from_class(class: i64) -> Result<Self, RiskError> {
        match class {
            0 => Ok(RiskLabel::Low),
            1 => Ok(RiskLabel::High),
            other => Err(RiskError::UnknownClass(other)),
        }
    }

    pub fn class(self) -> u8 {
        match self {
            RiskLabel::Low => 0,
            RiskLabel::High => 1,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low Risk",
            RiskLabel::High => "High Risk",
        }
    }

    /// "Class 0 (Low Risk)"
    pub fn caption(self) -> String {
        format!("Class {} ({})", self.class(), self.description())
    }
}

impl From<RiskLabel> for u8 {
    fn from(label: RiskLabel) -> u8 {
        label.class()
    }
}

impl TryFrom<u8> for RiskLabel {
    type Error = RiskError;

    fn try_from(class: u8) -> Result<Self, Self::Error> {
        RiskLabel::from_class(i64::from(class))
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class())
    }
}

/// Prediction for a single customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "CustomerId")]
    pub customer_id: String,
    #[serde(rename = "RiskPrediction")]
    pub risk_prediction: RiskLabel,
}

/// Number of customers per label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    pub low: usize,
    pub high: usize,
}

impl LabelCounts {
    pub fn from_results(results: &[PredictionResult]) -> Self {
        results.iter().fold(Self::default(), |mut c, r| {
            match r.risk_prediction {
                RiskLabel::Low => c.low += 1,
                RiskLabel::High => c.high += 1,
            }
            c
        })
    }

    pub fn get(&self, label: RiskLabel) -> usize {
        match label {
            RiskLabel::Low => self.low,
            RiskLabel::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.high
    }
}

/// Attach classifier output to customers by `CustomerId`.
///
/// `classes[i]` is the model output for `ids[i]`. Identifiers must be unique.
/// Results come back in `ids` order.
pub fn attach_predictions(
    ids: &[String],
    classes: &[i64],
) -> Result<Vec<PredictionResult>, RiskError> {
    if ids.len() != classes.len() {
        return Err(RiskError::CountMismatch {
            expected: ids.len(),
            got: classes.len(),
        });
    }

    let mut by_id: HashMap<&str, RiskLabel> = HashMap::with_capacity(ids.len());
    for (id, &class) in ids.iter().zip(classes) {
        if by_id.insert(id.as_str(), RiskLabel::from_class(class)?).is_some() {
            return Err(RiskError::DuplicateId(id.clone()));
        }
    }

    Ok(ids
        .iter()
        .filter_map(|id| {
            by_id.get(id.as_str()).map(|&label| PredictionResult {
                customer_id: id.clone(),
                risk_prediction: label,
            })
        })
        .collect())
}
