//! Classifier output types.

use serde::{Deserialize, Serialize};

use super::advice::Advice;
use super::features::FeatureVector;

/// Error type for model loading and inference.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Artifact missing, malformed, or failed its integrity check.
    #[error("Failed to load model artifact: {0}")]
    Load(String),

    /// Feature vector the classifier cannot consume.
    #[error("Invalid feature vector: {0}")]
    InvalidInput(String),
}

/// Binary class predicted by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Class 0
    Productive,
    /// Class 1
    Procrastinating,
}

impl Label {
    /// Map a class index to a label.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidInput` for anything other than 0 or 1.
    pub fn from_class(class: u8) -> Result<Self, ModelError> {
        match class {
            0 => Ok(Self::Productive),
            1 => Ok(Self::Procrastinating),
            other => Err(ModelError::InvalidInput(format!(
                "Classifier returned unknown class {other}"
            ))),
        }
    }

    #[must_use]
    pub fn class(self) -> u8 {
        match self {
            Self::Productive => 0,
            Self::Procrastinating => 1,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Productive => write!(f, "PRODUCTIVE"),
            Self::Procrastinating => write!(f, "PROCRASTINATING"),
        }
    }
}

/// Label plus class probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,

    /// Probability of `Label::Procrastinating` (0.0 to 1.0)
    pub probability: f64,

    /// `[p(productive), p(procrastinating)]`
    pub class_probabilities: [f64; 2],
}

impl Prediction {
    /// Build from the classifier's label and `[p0, p1]`.
    #[must_use]
    pub fn new(label: Label, class_probabilities: [f64; 2]) -> Self {
        Self {
            label,
            probability: class_probabilities[1],
            class_probabilities,
        }
    }
}

/// Everything the result panel shows for one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub features: FeatureVector,
    pub prediction: Prediction,
    pub advice: Advice,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    #[must_use]
    pub fn new(features: FeatureVector, prediction: Prediction) -> Self {
        Self {
            features,
            advice: Advice::for_prediction(&prediction),
            prediction,
            created_at: chrono::Utc::now(),
        }
    }
}
