//! Native decision-tree ensemble loaded from JSON.
//!
//! Layout mirrors an sklearn `RandomForestClassifier`: every tree is a flat node
//! list in pre-order, splits go left when `x[feature] <= threshold`, and leaves
//! carry a class-probability vector. Tree outputs are averaged and the class with
//! the highest mean probability wins (ties go to the lower class).
//!
//! ```json
//! {
//!   "feature_names": ["FirstDay", "...", "Stability"],
//!   "n_classes": 2,
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 15, "threshold": 0.5, "left": 1, "right": 2 },
//!         { "value": [0.9, 0.1] },
//!         { "value": [0.2, 0.8] }
//!     ] }
//!   ]
//! }
//! ```

use super::{check_feature_dim, ModelError, RiskScorer};
use crate::features::{FEATURE_COLUMNS, FEATURE_DIM};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f32>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub feature_names: Vec<String>,
    #[serde(default = "default_classes")]
    pub n_classes: usize,
    pub trees: Vec<Tree>,
}

fn default_classes() -> usize {
    2
}

impl ForestModel {
    /// Structural checks so that scoring can never index out of bounds or loop.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.feature_names.len() != FEATURE_DIM
            || self.feature_names.iter().zip(FEATURE_COLUMNS).any(|(a, b)| a != b)
        {
            return Err(ModelError::Artifact(format!(
                "feature_names must be exactly {FEATURE_COLUMNS:?}"
            )));
        }
        if self.n_classes < 2 {
            return Err(ModelError::Artifact("n_classes must be at least 2".to_string()));
        }
        if self.trees.is_empty() {
            return Err(ModelError::Artifact("forest has no trees".to_string()));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ModelError::Artifact(format!("tree {t} has no nodes")));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        let n = tree.nodes.len();
                        if *feature >= FEATURE_DIM {
                            return Err(ModelError::Artifact(format!(
                                "tree {t} node {i}: feature {feature} out of range"
                            )));
                        }
                        // children strictly after the parent: pre-order, no cycles
                        if *left <= i || *right <= i || *left >= n || *right >= n {
                            return Err(ModelError::Artifact(format!(
                                "tree {t} node {i}: invalid child index"
                            )));
                        }
                    }
                    Node::Leaf { value } => {
                        if value.len() != self.n_classes {
                            return Err(ModelError::Artifact(format!(
                                "tree {t} node {i}: leaf has {} values, expected {}",
                                value.len(),
                                self.n_classes
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf<'a>(tree: &'a Tree, row: &ArrayView1<'_, f32>) -> &'a [f32] {
        let mut idx = 0;
        loop {
            match &tree.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { value } => return value,
            }
        }
    }

    /// Mean class probabilities for one row
    pub fn predict_proba_row(&self, row: &ArrayView1<'_, f32>) -> Vec<f32> {
        let mut acc = vec![0.0f32; self.n_classes];
        for tree in &self.trees {
            for (a, v) in acc.iter_mut().zip(Self::leaf(tree, row)) {
                *a += v;
            }
        }
        let n = self.trees.len() as f32;
        acc.iter_mut().for_each(|a| *a /= n);
        acc
    }

    pub fn predict_row(&self, row: &ArrayView1<'_, f32>) -> i64 {
        let proba = self.predict_proba_row(row);
        let mut best = 0usize;
        for (i, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = i;
            }
        }
        best as i64
    }
}

pub struct ForestScorer {
    model: ForestModel,
}

impl ForestScorer {
    pub fn new(model: ForestModel) -> Result<Self, ModelError> {
        model.validate()?;
        Ok(Self { model })
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let data = std::fs::read_to_string(path)?;
        let model: ForestModel = serde_json::from_str(&data)?;
        Self::new(model)
    }
}

impl RiskScorer for ForestScorer {
    fn name(&self) -> &str {
        "forest"
    }

    fn predict(&self, features: &Array2<f32>) -> Result<Vec<i64>, ModelError> {
        check_feature_dim(features)?;
        Ok(features
            .rows()
            .into_iter()
            .map(|row| self.model.predict_row(&row))
            .collect())
    }
}
