//! ONNX Runtime inference. Input: [n, FEATURE_DIM] f32, Output: one class per row.
//! Uses `ort`; the runtime library is loaded dynamically (`ORT_DYLIB_PATH`).

use super::{check_feature_dim, ModelError, RiskScorer};
use crate::features::FEATURE_DIM;
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

fn ort_err<E: std::fmt::Display>(e: E) -> ModelError {
    ModelError::Onnx(e.to_string())
}

pub struct OnnxScorer {
    // `Session::run` takes `&mut self`
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxScorer {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let session = Session::builder()
            .map_err(ort_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort_err)?
            .commit_from_file(path)
            .map_err(ort_err)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // skl2onnx classifiers expose `output_label` (int64) and `output_probability`
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::Artifact("ONNX model declares no outputs".to_string()))?;

        debug!(input = %input_name, output = %output_name, "ONNX session ready");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl RiskScorer for OnnxScorer {
    fn name(&self) -> &str {
        "onnx"
    }

    fn predict(&self, features: &Array2<f32>) -> Result<Vec<i64>, ModelError> {
        check_feature_dim(features)?;
        let rows = features.nrows();

        let shape = vec![rows as i64, FEATURE_DIM as i64];
        let input = Tensor::from_array((shape, features.iter().copied().collect::<Vec<f32>>()))
            .map_err(ort_err)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::Inference("ONNX session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(ort_err)?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            ModelError::Inference(format!("model produced no '{}' output", self.output_name))
        })?;

        let classes = if let Ok((_, labels)) = output.try_extract_tensor::<i64>() {
            labels.to_vec()
        } else {
            let (shape, scores) = output.try_extract_tensor::<f32>().map_err(ort_err)?;
            let dims: Vec<i64> = shape.iter().copied().collect();
            classes_from_scores(&dims, scores)?
        };

        if classes.len() != rows {
            return Err(ModelError::Inference(format!(
                "model returned {} labels for {} rows",
                classes.len(),
                rows
            )));
        }
        Ok(classes)
    }
}

/// Reduce float scores to classes: argmax over `[n, k]` (k >= 2), `>= 0.5` over `[n]` or `[n, 1]`.
fn classes_from_scores(dims: &[i64], scores: &[f32]) -> Result<Vec<i64>, ModelError> {
    match dims {
        [_] | [_, 1] => Ok(scores.iter().map(|&p| i64::from(p >= 0.5)).collect()),
        [_, k] if *k >= 2 => Ok(scores
            .chunks(*k as usize)
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0usize, f32::NEG_INFINITY), |best, (i, &p)| {
                        if p > best.1 {
                            (i, p)
                        } else {
                            best
                        }
                    })
                    .0 as i64
            })
            .collect()),
        _ => Err(ModelError::Inference(format!(
            "unsupported output shape {dims:?}"
        ))),
    }
}
