//! Customer feature schema and CSV ingestion.

mod table;

pub use table::{parse_csv, FeatureTable};

use thiserror::Error;

/// Identifier column; carried through to the report but never scored.
pub const ID_COLUMN: &str = "CustomerId";

/// Number of numerical features expected by the model
pub const FEATURE_DIM: usize = 16;

/// Model input columns, in the order the classifier was trained on.
pub const FEATURE_COLUMNS: [&str; FEATURE_DIM] = [
    "FirstDay",
    "FirstMonth",
    "FirstYear",
    "LastDay",
    "LastMonth",
    "LastYear",
    "TotalTransactionAmount",
    "AverageTransactionAmount",
    "TransactionCount",
    "TransactionAmountStdDev",
    "MinTransactionAmount",
    "MaxTransactionAmount",
    "Recency",
    "Frequency",
    "Monetary",
    "Stability",
];

/// All seventeen columns an upload must carry: the identifier followed by the features.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    std::iter::once(ID_COLUMN).chain(FEATURE_COLUMNS)
}

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Missing required columns in the CSV")]
    MissingColumns(Vec<String>),

    #[error("The CSV contains no data rows")]
    Empty,

    #[error("Row {row}: empty CustomerId")]
    EmptyId { row: usize },

    #[error("Duplicate CustomerId '{0}' in the CSV")]
    DuplicateId(String),

    #[error("Row {row}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Feature matrix shape mismatch: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
