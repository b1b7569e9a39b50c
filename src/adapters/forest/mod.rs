//! Random-forest adapter: Implementation of `Classifier` and `Scaler` over
//! JSON exports of a scikit-learn `RandomForestClassifier` and
//! `StandardScaler`.
//!
//! # Artifact layout
//!
//! The model directory holds `forest.json` and `scaler.json`, optionally bound
//! by `manifest.json` (SHA-256 per file) and `model.sig` (Ed25519 over the
//! manifest). See [`manifest`] for the integrity rules.
//!
//! # Tree encoding
//!
//! Each tree uses the flat array layout of scikit-learn's `tree_` attribute:
//! node `i` is a leaf when `children_left[i] == -1`, otherwise it routes left
//! when `x[feature[i]] <= threshold[i]`. Leaf `value` rows are per-class
//! weights and are normalized on load.
//!
//! Loading rejects any structure that could index out of bounds or loop, so
//! inference itself cannot fail on a well-formed row.

pub mod manifest;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{features, ModelError, FEATURE_COUNT, FEATURE_NAMES};
use crate::ports::{Classifier, Scaler};

pub use manifest::{ArtifactManifest, ArtifactPolicy};

const FORMAT_VERSION: u32 = 1;
const N_CLASSES: usize = 2;

/// Classifier as exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedForest {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    /// Whether the forest was fit on `StandardScaler` output.
    #[serde(default)]
    pub scaled_inputs: bool,
    pub trees: Vec<ExportedTree>,
}

/// One tree in scikit-learn's flat layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

/// Scaler as exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: [f64; N_CLASSES],
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_export(index: usize, t: &ExportedTree) -> Result<Self, ModelError> {
        let n = t.children_left.len();
        if n == 0 {
            return Err(ModelError::Load(format!("Tree {index} has no nodes")));
        }
        if t.children_right.len() != n
            || t.feature.len() != n
            || t.threshold.len() != n
            || t.value.len() != n
        {
            return Err(ModelError::Load(format!(
                "Tree {index}: node array lengths differ"
            )));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (t.children_left[i], t.children_right[i]);
            let weights = class_weights(index, i, &t.value[i])?;

            if left == -1 {
                if right != -1 {
                    return Err(ModelError::Load(format!(
                        "Tree {index} node {i}: leaf with a right child"
                    )));
                }
                nodes.push(Node::Leaf {
                    distribution: leaf_distribution(index, i, weights)?,
                });
                continue;
            }

            // Children must come after their parent, which rules out cycles.
            let child = |c: i64| -> Result<usize, ModelError> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .ok_or_else(|| {
                        ModelError::Load(format!("Tree {index} node {i}: bad child index {c}"))
                    })
            };
            let feature = usize::try_from(t.feature[i])
                .ok()
                .filter(|&f| f < FEATURE_COUNT)
                .ok_or_else(|| {
                    ModelError::Load(format!(
                        "Tree {index} node {i}: bad feature index {}",
                        t.feature[i]
                    ))
                })?;
            if !t.threshold[i].is_finite() {
                return Err(ModelError::Load(format!(
                    "Tree {index} node {i}: non-finite threshold"
                )));
            }

            nodes.push(Node::Split {
                feature,
                threshold: t.threshold[i],
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    fn leaf(&self, x: &[f64]) -> &[f64; N_CLASSES] {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // scikit-learn compares in f32; thresholds sit on f32 midpoints.
                    let v = f64::from(x[*feature] as f32);
                    i = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Every node's `value` row must hold two finite, non-negative class weights.
fn class_weights(
    tree: usize,
    node: usize,
    value: &[f64],
) -> Result<[f64; N_CLASSES], ModelError> {
    let weights: [f64; N_CLASSES] = value.try_into().map_err(|_| {
        ModelError::Load(format!(
            "Tree {tree} node {node}: expected {N_CLASSES} class weights, got {}",
            value.len()
        ))
    })?;
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ModelError::Load(format!(
            "Tree {tree} node {node}: class weights must be finite and non-negative"
        )));
    }
    Ok(weights)
}

fn leaf_distribution(
    tree: usize,
    node: usize,
    weights: [f64; N_CLASSES],
) -> Result<[f64; N_CLASSES], ModelError> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(ModelError::Load(format!(
            "Tree {tree} node {node}: leaf has zero total weight"
        )));
    }
    Ok([weights[0] / total, weights[1] / total])
}

fn check_feature_names(names: &[String], what: &str) -> Result<(), ModelError> {
    if names.len() != FEATURE_COUNT || names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b) {
        return Err(ModelError::Load(format!(
            "{what} feature_names do not match the expected columns {FEATURE_NAMES:?}"
        )));
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ModelError::Load(format!("Failed to read {path:?}: {e}")))?;
    serde_json::from_str(&content)
        .map_err(|e| ModelError::Load(format!("Malformed {path:?}: {e}")))
}

/// Random-forest binary classifier.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    trees: Vec<Tree>,
    scaled_inputs: bool,
}

impl ForestClassifier {
    /// Validate an export and build the classifier.
    ///
    /// # Errors
    /// Returns `ModelError::Load` if the export is structurally invalid.
    pub fn from_export(export: &ExportedForest) -> Result<Self, ModelError> {
        if export.format_version != FORMAT_VERSION {
            return Err(ModelError::Load(format!(
                "Unsupported forest format_version {} (expected {FORMAT_VERSION})",
                export.format_version
            )));
        }
        check_feature_names(&export.feature_names, "Forest")?;
        if export.trees.is_empty() {
            return Err(ModelError::Load("Forest has no trees".into()));
        }

        let trees = export
            .trees
            .iter()
            .enumerate()
            .map(|(i, t)| Tree::from_export(i, t))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            scaled_inputs: export.scaled_inputs,
        })
    }

    /// Load `forest.json`.
    ///
    /// # Errors
    /// Returns `ModelError::Load` if the file is missing or invalid.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let export: ExportedForest = read_json(path)?;
        let forest = Self::from_export(&export)?;
        tracing::info!(
            "Loaded forest from {:?} (n_trees={}, scaled_inputs={})",
            path,
            forest.n_trees(),
            forest.scaled_inputs
        );
        Ok(forest)
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for ForestClassifier {
    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn expects_scaled_inputs(&self) -> bool {
        self.scaled_inputs
    }

    fn predict_proba(&self, x: &[f64]) -> Result<[f64; 2], ModelError> {
        features::check_columns(x)?;

        let mut sum = [0.0; N_CLASSES];
        for tree in &self.trees {
            let leaf = tree.leaf(x);
            sum[0] += leaf[0];
            sum[1] += leaf[1];
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

/// Per-column standardization: `(x - mean) / scale`.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Validate an export and build the scaler.
    ///
    /// # Errors
    /// Returns `ModelError::Load` on mismatched names, lengths, or non-finite values.
    pub fn from_export(export: &ExportedScaler) -> Result<Self, ModelError> {
        check_feature_names(&export.feature_names, "Scaler")?;

        let to_array = |v: &[f64], what: &str| -> Result<[f64; FEATURE_COUNT], ModelError> {
            let arr: [f64; FEATURE_COUNT] = v.try_into().map_err(|_| {
                ModelError::Load(format!(
                    "Scaler {what} has {} entries, expected {FEATURE_COUNT}",
                    v.len()
                ))
            })?;
            if arr.iter().any(|x| !x.is_finite()) {
                return Err(ModelError::Load(format!("Scaler {what} has non-finite entries")));
            }
            Ok(arr)
        };

        let mean = to_array(&export.mean, "mean")?;
        let mut scale = to_array(&export.scale, "scale")?;
        // Zero-variance columns pass through unscaled.
        for s in scale.iter_mut() {
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Ok(Self { mean, scale })
    }

    /// Load `scaler.json`.
    ///
    /// # Errors
    /// Returns `ModelError::Load` if the file is missing or invalid.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let export: ExportedScaler = read_json(path)?;
        let scaler = Self::from_export(&export)?;
        tracing::info!("Loaded scaler from {:?}", path);
        Ok(scaler)
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        features::check_columns(x)?;
        let scaled = x
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(v, (m, s))| (v - m) / s)
            .collect();
        Ok(scaled)
    }
}

/// Verify and load both artifacts from `model_dir`.
///
/// # Errors
/// Returns `ModelError::Load` if integrity checks fail or either artifact is
/// missing or malformed.
pub fn load_artifacts(
    model_dir: &Path,
    policy: &ArtifactPolicy,
) -> Result<(ForestClassifier, StandardScaler), ModelError> {
    if !model_dir.is_dir() {
        return Err(ModelError::Load(format!(
            "Model directory not found at {model_dir:?}"
        )));
    }

    manifest::verify_artifacts(model_dir, policy)?;

    let forest = ForestClassifier::load(&model_dir.join(manifest::FOREST_FILE))?;
    let scaler = StandardScaler::load(&model_dir.join(manifest::SCALER_FILE))?;
    Ok((forest, scaler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect()
    }

    /// Stump on productivity_ratio: <= 0.5 leans procrastinating.
    fn stump(left: [f64; 2], right: [f64; 2]) -> ExportedTree {
        ExportedTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![7, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![vec![50.0, 50.0], left.to_vec(), right.to_vec()],
        }
    }

    fn forest(trees: Vec<ExportedTree>) -> ExportedForest {
        ExportedForest {
            format_version: 1,
            feature_names: names(),
            scaled_inputs: false,
            trees,
        }
    }

    fn row(productivity_ratio: f64) -> Vec<f64> {
        let mut x = vec![7.0, 3.0, 2.0, 5.0, 3.0, 6.0, 60.0, 0.0, 1.0, 0.67];
        x[7] = productivity_ratio;
        x
    }

    #[test]
    fn test_single_tree_routing() {
        let f = ForestClassifier::from_export(&forest(vec![stump([10.0, 30.0], [36.0, 4.0])]))
            .expect("valid");

        let p = f.predict_proba(&row(0.2)).expect("proba");
        assert!((p[1] - 0.75).abs() < 1e-12);
        assert_eq!(f.predict(&row(0.2)).expect("predict"), 1);

        let p = f.predict_proba(&row(0.8)).expect("proba");
        assert!((p[1] - 0.1).abs() < 1e-12);
        assert_eq!(f.predict(&row(0.8)).expect("predict"), 0);
    }

    #[test]
    fn test_threshold_is_inclusive_on_the_left() {
        let f = ForestClassifier::from_export(&forest(vec![stump([0.0, 1.0], [1.0, 0.0])]))
            .expect("valid");
        assert_eq!(f.predict(&row(0.5)).expect("predict"), 1);
    }

    #[test]
    fn test_forest_averages_trees() {
        let f = ForestClassifier::from_export(&forest(vec![
            stump([0.0, 1.0], [1.0, 0.0]),
            stump([0.5, 0.5], [1.0, 0.0]),
        ]))
        .expect("valid");

        let p = f.predict_proba(&row(0.1)).expect("proba");
        assert!((p[0] - 0.25).abs() < 1e-12);
        assert!((p[1] - 0.75).abs() < 1e-12);
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_goes_to_class_zero() {
        let f = ForestClassifier::from_export(&forest(vec![stump([1.0, 1.0], [1.0, 1.0])]))
            .expect("valid");
        assert_eq!(f.predict(&row(0.1)).expect("predict"), 0);
    }

    #[test]
    fn test_rejects_bad_rows() {
        let f = ForestClassifier::from_export(&forest(vec![stump([0.0, 1.0], [1.0, 0.0])]))
            .expect("valid");
        assert!(matches!(
            f.predict_proba(&[1.0; 3]),
            Err(ModelError::InvalidInput(_))
        ));
        let mut x = row(0.3);
        x[0] = f64::INFINITY;
        assert!(matches!(f.predict(&x), Err(ModelError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_malformed_exports() {
        // Cycle: node 1 points back at the root.
        let mut cyclic = stump([0.0, 1.0], [1.0, 0.0]);
        cyclic.children_left = vec![1, 0, -1];
        cyclic.children_right = vec![2, 2, -1];
        cyclic.feature = vec![7, 0, -2];
        cyclic.threshold = vec![0.5, 1.0, -2.0];
        assert!(ForestClassifier::from_export(&forest(vec![cyclic])).is_err());

        let mut bad_feature = stump([0.0, 1.0], [1.0, 0.0]);
        bad_feature.feature[0] = 10;
        assert!(ForestClassifier::from_export(&forest(vec![bad_feature])).is_err());

        let mut ragged = stump([0.0, 1.0], [1.0, 0.0]);
        ragged.threshold.pop();
        assert!(ForestClassifier::from_export(&forest(vec![ragged])).is_err());

        let mut empty_leaf = stump([0.0, 1.0], [1.0, 0.0]);
        empty_leaf.value[1] = vec![0.0, 0.0];
        assert!(ForestClassifier::from_export(&forest(vec![empty_leaf])).is_err());

        // Internal rows are checked too, not only the leaves that get used.
        let mut long_root_row = stump([0.0, 1.0], [1.0, 0.0]);
        long_root_row.value[0] = vec![1.0, 2.0, 3.0];
        assert!(ForestClassifier::from_export(&forest(vec![long_root_row])).is_err());

        let mut nan_root_row = stump([0.0, 1.0], [1.0, 0.0]);
        nan_root_row.value[0] = vec![1.0, f64::NAN];
        assert!(ForestClassifier::from_export(&forest(vec![nan_root_row])).is_err());

        assert!(ForestClassifier::from_export(&forest(vec![])).is_err());

        let mut wrong_names = forest(vec![stump([0.0, 1.0], [1.0, 0.0])]);
        wrong_names.feature_names.swap(0, 1);
        assert!(ForestClassifier::from_export(&wrong_names).is_err());

        let mut wrong_version = forest(vec![stump([0.0, 1.0], [1.0, 0.0])]);
        wrong_version.format_version = 2;
        assert!(ForestClassifier::from_export(&wrong_version).is_err());
    }

    #[test]
    fn test_scaler_transform() {
        let scaler = StandardScaler::from_export(&ExportedScaler {
            feature_names: names(),
            mean: vec![7.0, 3.0, 2.0, 5.0, 3.0, 6.0, 60.0, 0.6, 1.0, 0.0],
            scale: vec![2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 30.0, 0.5, 1.0, 0.0],
        })
        .expect("valid");

        let out = scaler.transform(&row(0.6)).expect("transform");
        assert_eq!(out.len(), FEATURE_COUNT);
        assert!(out[0].abs() < 1e-12);
        assert!(out[7].abs() < 1e-12);
        // Zero scale treated as 1.
        assert!((out[9] - 0.67).abs() < 1e-12);

        assert!(scaler.transform(&[0.0; 4]).is_err());
    }

    #[test]
    fn test_scaler_rejects_bad_lengths() {
        let export = ExportedScaler {
            feature_names: names(),
            mean: vec![0.0; 9],
            scale: vec![1.0; 10],
        };
        assert!(StandardScaler::from_export(&export).is_err());
    }

    #[test]
    fn test_load_artifacts_from_dir() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        let export = forest(vec![stump([0.0, 1.0], [1.0, 0.0])]);
        fs::write(
            dir.join(manifest::FOREST_FILE),
            serde_json::to_vec(&export).expect("serialize"),
        )
        .expect("write forest");
        let scaler = ExportedScaler {
            feature_names: names(),
            mean: vec![0.0; 10],
            scale: vec![1.0; 10],
        };
        fs::write(
            dir.join(manifest::SCALER_FILE),
            serde_json::to_vec(&scaler).expect("serialize"),
        )
        .expect("write scaler");

        let (forest, _scaler) =
            load_artifacts(dir, &ArtifactPolicy::default()).expect("load artifacts");
        assert_eq!(forest.n_trees(), 1);
    }

    #[test]
    fn test_load_artifacts_missing_files() {
        let temp = tempdir().expect("tempdir");
        let err = load_artifacts(temp.path(), &ArtifactPolicy::default()).expect_err("must fail");
        assert!(matches!(err, ModelError::Load(_)));

        let err = load_artifacts(&temp.path().join("nope"), &ArtifactPolicy::default())
            .expect_err("must fail");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join(manifest::FOREST_FILE);
        fs::write(&path, b"{ not json").expect("write");
        assert!(matches!(
            ForestClassifier::load(&path),
            Err(ModelError::Load(_))
        ));
    }
}
