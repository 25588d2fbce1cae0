//! JSON exports of the pre-trained scaler and classifier
//!
//! Artifacts are validated against the 14-feature schema when they are
//! loaded, so inference on a validated artifact cannot fail.

use super::predictor::{FeatureScaler, HealthClassifier};
use cropsight_core::error::{CropsightError, Result};
use cropsight_core::models::{FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Leaf marker in scikit-learn tree arrays
const TREE_LEAF: i64 = -1;

fn read_artifact<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| CropsightError::ModelArtifact {
        path: path.to_path_buf(),
        reason: format!("Failed to read artifact: {}", e),
    })?;

    serde_json::from_str(&content).map_err(|e| CropsightError::ModelArtifact {
        path: path.to_path_buf(),
        reason: format!("Failed to parse artifact: {}", e),
    })
}

fn schema_error(artifact: &str, reason: impl Into<String>) -> CropsightError {
    CropsightError::FeatureSchemaMismatch { artifact: artifact.to_string(), reason: reason.into() }
}

fn check_feature_names(artifact: &str, names: &[String]) -> Result<()> {
    if names.len() != FEATURE_COUNT {
        return Err(schema_error(
            artifact,
            format!("expected {} features, found {}", FEATURE_COUNT, names.len()),
        ));
    }

    for (position, (found, expected)) in names.iter().zip(FEATURE_NAMES).enumerate() {
        if found != expected {
            return Err(schema_error(
                artifact,
                format!("feature {} is '{}', expected '{}'", position, found, expected),
            ));
        }
    }
    Ok(())
}

fn check_length(artifact: &str, field: &str, len: usize) -> Result<()> {
    if len != FEATURE_COUNT {
        return Err(schema_error(
            artifact,
            format!("'{}' has {} values, expected {}", field, len, FEATURE_COUNT),
        ));
    }
    Ok(())
}

/// Standardisation with per-feature mean and scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn load(path: &Path) -> Result<Self> {
        let scaler: Self = read_artifact(path)?;
        scaler.validate()?;
        tracing::info!("Loaded feature scaler from {}", path.display());
        Ok(scaler)
    }

    pub fn validate(&self) -> Result<()> {
        check_feature_names("scaler", &self.feature_names)?;
        check_length("scaler", "mean", self.mean.len())?;
        check_length("scaler", "scale", self.scale.len())?;

        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(schema_error("scaler", "mean and scale must be finite"));
        }
        Ok(())
    }
}

impl FeatureScaler for StandardScaler {
    fn check_schema(&self) -> Result<()> {
        self.validate()
    }

    fn transform(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0; FEATURE_COUNT];
        for (i, value) in features.iter().enumerate() {
            // Constant features were fitted with zero variance
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            scaled[i] = (value - self.mean[i]) / scale;
        }
        scaled
    }
}

/// One fitted decision tree in scikit-learn's array layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights, `[unhealthy, healthy]`
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, index: usize) -> Result<()> {
        let n = self.node_count();
        let tree_error =
            |reason: String| schema_error("classifier", format!("tree {}: {}", index, reason));

        if n == 0 {
            return Err(tree_error("has no nodes".to_string()));
        }
        if [self.children_right.len(), self.feature.len(), self.threshold.len(), self.value.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err(tree_error("node arrays have different lengths".to_string()));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);

            if left == TREE_LEAF || right == TREE_LEAF {
                if left != right {
                    return Err(tree_error(format!("node {} has a single child", node)));
                }
                let weights = &self.value[node];
                if weights.len() != 2
                    || weights.iter().any(|w| !w.is_finite() || *w < 0.0)
                    || weights.iter().sum::<f64>() <= 0.0
                {
                    return Err(tree_error(format!(
                        "leaf {} needs two non-negative class weights",
                        node
                    )));
                }
                continue;
            }

            // Children always follow their parent, which rules out cycles
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(tree_error(format!(
                        "node {} has child {} out of range",
                        node, child
                    )));
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature >= FEATURE_COUNT as i64 {
                return Err(tree_error(format!("node {} splits on feature {}", node, feature)));
            }
            if self.threshold[node].is_nan() {
                return Err(tree_error(format!("node {} has a NaN threshold", node)));
            }
        }
        Ok(())
    }

    /// Normalised class weights of the leaf reached by `x`
    fn leaf_proba(&self, x: &[f64; FEATURE_COUNT]) -> [f64; 2] {
        let mut node = 0usize;
        while self.children_left[node] != TREE_LEAF {
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        let weights = &self.value[node];
        let total = weights[0] + weights[1];
        [weights[0] / total, weights[1] / total]
    }
}

/// Fitted estimator, tagged by `"type"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierModel {
    LogisticRegression { coefficients: Vec<f64>, intercept: f64 },
    RandomForest { trees: Vec<DecisionTree> },
}

/// Binary health classifier: class 0 is unhealthy, class 1 is healthy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub feature_names: Vec<String>,
    pub classes: Vec<u8>,
    pub model: ClassifierModel,
}

impl ClassifierArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let artifact: Self = read_artifact(path)?;
        artifact.validate()?;
        tracing::info!("Loaded {} from {}", artifact.describe(), path.display());
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<()> {
        check_feature_names("classifier", &self.feature_names)?;

        if self.classes != [0u8, 1] {
            return Err(schema_error(
                "classifier",
                format!("classes must be [0, 1], found {:?}", self.classes),
            ));
        }

        match &self.model {
            ClassifierModel::LogisticRegression { coefficients, intercept } => {
                check_length("classifier", "coefficients", coefficients.len())?;
                if coefficients.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
                    return Err(schema_error("classifier", "coefficients must be finite"));
                }
            }
            ClassifierModel::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(schema_error("classifier", "random forest has no trees"));
                }
                for (index, tree) in trees.iter().enumerate() {
                    tree.validate(index)?;
                }
            }
        }
        Ok(())
    }
}

impl HealthClassifier for ClassifierArtifact {
    fn check_schema(&self) -> Result<()> {
        self.validate()
    }

    fn predict_proba(&self, scaled: &[f64; FEATURE_COUNT]) -> [f64; 2] {
        match &self.model {
            ClassifierModel::LogisticRegression { coefficients, intercept } => {
                let z: f64 =
                    intercept + coefficients.iter().zip(scaled).map(|(c, x)| c * x).sum::<f64>();
                let healthy = 1.0 / (1.0 + (-z).exp());
                [1.0 - healthy, healthy]
            }
            ClassifierModel::RandomForest { trees } => {
                let mut sum = [0.0, 0.0];
                for tree in trees {
                    let proba = tree.leaf_proba(scaled);
                    sum[0] += proba[0];
                    sum[1] += proba[1];
                }
                let n = trees.len() as f64;
                [sum[0] / n, sum[1] / n]
            }
        }
    }

    fn describe(&self) -> String {
        match &self.model {
            ClassifierModel::LogisticRegression { .. } => "logistic regression".to_string(),
            ClassifierModel::RandomForest { trees } => {
                format!("random forest ({} trees)", trees.len())
            }
        }
    }
}
