//! CSV upload → feature table: header check, canonical column order, numeric parse.

use super::{FeatureError, FEATURE_COLUMNS, FEATURE_DIM, ID_COLUMN};
use ndarray::{Array2, ErrorKind, ShapeError};
use std::collections::HashSet;

/// Parsed upload. Row `i` of `features` belongs to `ids[i]`; order matches the file.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    ids: Vec<String>,
    features: Array2<f32>,
}

impl FeatureTable {
    /// Build from identifiers and an `[n, FEATURE_DIM]` matrix.
    fn new(ids: Vec<String>, features: Array2<f32>) -> Result<Self, FeatureError> {
        if features.dim() != (ids.len(), FEATURE_DIM) {
            return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
        }
        Ok(Self { ids, features })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Model input: identifier column already dropped.
    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }
}

struct ColumnPositions {
    id: usize,
    features: [usize; FEATURE_DIM],
}

fn column_positions(headers: &csv::StringRecord) -> Result<ColumnPositions, FeatureError> {
    let find = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<String> = super::required_columns()
        .filter(|c| find(c).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(FeatureError::MissingColumns(missing));
    }

    let mut features = [0usize; FEATURE_DIM];
    for (slot, name) in features.iter_mut().zip(FEATURE_COLUMNS) {
        *slot = find(name).unwrap_or_default();
    }
    Ok(ColumnPositions {
        id: find(ID_COLUMN).unwrap_or_default(),
        features,
    })
}

fn parse_value(raw: &str) -> Option<f32> {
    raw.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Parse an uploaded CSV (header row required). Extra columns are ignored;
/// features are reordered to [`FEATURE_COLUMNS`].
pub fn parse_csv(data: &[u8]) -> Result<FeatureTable, FeatureError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let positions = column_positions(&headers)?;

    let mut ids: Vec<String> = Vec::new();
    let mut values: Vec<f32> = Vec::new();
    let mut seen = HashSet::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let id = record.get(positions.id).unwrap_or_default();
        if id.is_empty() {
            return Err(FeatureError::EmptyId { row });
        }
        if !seen.insert(id.to_string()) {
            return Err(FeatureError::DuplicateId(id.to_string()));
        }

        for (column, &pos) in FEATURE_COLUMNS.iter().zip(positions.features.iter()) {
            let raw = record.get(pos).unwrap_or_default();
            let value = parse_value(raw).ok_or_else(|| FeatureError::InvalidNumber {
                row,
                column: *column,
                value: raw.to_string(),
            })?;
            values.push(value);
        }
        ids.push(id.to_string());
    }

    if ids.is_empty() {
        return Err(FeatureError::Empty);
    }

    let features = Array2::from_shape_vec((ids.len(), FEATURE_DIM), values)?;
    FeatureTable::new(ids, features)
}
