//! Application state shared by all handlers.

use crate::config::ReportConfig;
use crate::model::RiskScorer;
use std::sync::Arc;

/// Built once at startup; nothing in here is mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<dyn RiskScorer>,
    pub report: ReportConfig,
}

impl AppState {
    pub fn new(scorer: Arc<dyn RiskScorer>, report: ReportConfig) -> Self {
        Self { scorer, report }
    }
}
