//! Pre-trained risk classifier behind a swappable scoring interface.
//!
//! The artifact is loaded once at startup by [`load_scorer`] and shared read-only
//! as `Arc<dyn RiskScorer>`. Two formats are understood:
//! - `.onnx`: ONNX Runtime session (e.g. an sklearn pipeline exported with skl2onnx)
//! - `.json`: serialized decision-tree ensemble, see [`ForestScorer`]

mod forest;
mod onnx;

pub use forest::{ForestModel, ForestScorer, Node, Tree};
pub use onnx::OnnxScorer;

use crate::features::FEATURE_DIM;
use ndarray::Array2;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported model format '{}'; expected .onnx or .json", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Model I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ONNX Runtime error: {0}")]
    Onnx(String),

    #[error("Invalid model artifact: {0}")]
    Artifact(String),

    #[error("Expected {expected} features per row, got {got}")]
    FeatureDim { expected: usize, got: usize },

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Rows in, class labels out. One label per row, same order, no side effects.
pub trait RiskScorer: Send + Sync {
    /// Short model kind for logs and the health endpoint
    fn name(&self) -> &str;

    /// Classify each row of an `[n, FEATURE_DIM]` matrix.
    fn predict(&self, features: &Array2<f32>) -> Result<Vec<i64>, ModelError>;
}

pub(crate) fn check_feature_dim(features: &Array2<f32>) -> Result<(), ModelError> {
    if features.ncols() != FEATURE_DIM {
        return Err(ModelError::FeatureDim {
            expected: FEATURE_DIM,
            got: features.ncols(),
        });
    }
    Ok(())
}

/// Hex SHA-256 of the artifact, logged at load for provenance.
pub fn artifact_digest(path: &Path) -> Result<String, ModelError> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Load the model artifact at `path`, choosing the scorer by file extension.
pub fn load_scorer(path: &Path) -> Result<Arc<dyn RiskScorer>, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let scorer: Arc<dyn RiskScorer> = match ext.as_deref() {
        Some("onnx") => Arc::new(OnnxScorer::load(path)?),
        Some("json") => Arc::new(ForestScorer::load(path)?),
        _ => return Err(ModelError::UnsupportedFormat(path.to_path_buf())),
    };

    let digest = artifact_digest(path)?;
    info!(
        path = %path.display(),
        kind = scorer.name(),
        sha256 = %digest,
        "model loaded"
    );
    Ok(scorer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let err = load_scorer(Path::new("nonexistent.onnx")).err().unwrap();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[test]
    fn unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        std::fs::write(&path, b"not a model").unwrap();
        let err = load_scorer(&path).err().unwrap();
        assert!(matches!(err, ModelError::UnsupportedFormat(_)));
    }

    #[test]
    fn digest_is_sha256_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            artifact_digest(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
