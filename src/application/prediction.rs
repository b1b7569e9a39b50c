//! Prediction service: Runs the derive → scale → classify pipeline.
//!
//! The classifier and scaler are loaded once by the composition root and
//! shared read-only through `Arc`; the service itself holds no mutable state,
//! so one instance serves every request.

use std::str::FromStr;
use std::sync::Arc;

use crate::domain::{
    features, Assessment, DailyHabits, FeatureVector, Label, ModelError, Prediction,
    FEATURE_COUNT,
};
use crate::ports::{Classifier, Scaler};

/// Whether the scaler runs before the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalerPolicy {
    /// Follow the classifier export's `scaled_inputs` flag.
    #[default]
    Auto,
    /// Always scale; requires a scaler.
    Apply,
    /// Never scale, even if a scaler is loaded.
    Skip,
}

impl FromStr for ScalerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "apply" => Ok(Self::Apply),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "Unknown scaler policy '{other}' (expected auto, apply or skip)"
            )),
        }
    }
}

/// Inference adapter over a loaded classifier and optional scaler.
pub struct PredictionService<C, S>
where
    C: Classifier,
    S: Scaler,
{
    classifier: Arc<C>,
    scaler: Option<Arc<S>>,
    apply_scaler: bool,
}

impl<C, S> PredictionService<C, S>
where
    C: Classifier,
    S: Scaler,
{
    /// Create the service and settle whether the scaler is applied.
    ///
    /// # Errors
    /// Returns `ModelError::Load` if the classifier expects a different column
    /// count, or scaling is required but no scaler was loaded.
    pub fn new(
        classifier: Arc<C>,
        scaler: Option<Arc<S>>,
        policy: ScalerPolicy,
    ) -> Result<Self, ModelError> {
        if classifier.n_features() != FEATURE_COUNT {
            return Err(ModelError::Load(format!(
                "Classifier expects {} features, pipeline produces {FEATURE_COUNT}",
                classifier.n_features()
            )));
        }

        let apply_scaler = match policy {
            ScalerPolicy::Auto => classifier.expects_scaled_inputs(),
            ScalerPolicy::Apply => true,
            ScalerPolicy::Skip => false,
        };
        if apply_scaler && scaler.is_none() {
            return Err(ModelError::Load(
                "Scaling is required but no scaler was loaded".into(),
            ));
        }
        if policy != ScalerPolicy::Auto
            && apply_scaler != classifier.expects_scaled_inputs()
        {
            tracing::warn!(
                "Scaler policy {:?} overrides the model export (scaled_inputs={})",
                policy,
                classifier.expects_scaled_inputs()
            );
        }

        tracing::info!(
            "Prediction service ready (scaler loaded={}, applied={})",
            scaler.is_some(),
            apply_scaler
        );

        Ok(Self {
            classifier,
            scaler,
            apply_scaler,
        })
    }

    #[must_use]
    pub fn applies_scaler(&self) -> bool {
        self.apply_scaler
    }

    /// Classify one raw feature row.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidInput` for malformed rows or if the model
    /// produces an unusable output.
    pub fn predict_row(&self, row: &[f64]) -> Result<Prediction, ModelError> {
        features::check_columns(row)?;

        let input = match (&self.scaler, self.apply_scaler) {
            (Some(scaler), true) => scaler.transform(row)?,
            _ => row.to_vec(),
        };

        let proba = self.classifier.predict_proba(&input)?;
        if proba.iter().any(|p| !p.is_finite() || !(0.0..=1.0).contains(p)) {
            return Err(ModelError::InvalidInput(format!(
                "Classifier produced invalid probabilities {proba:?}"
            )));
        }
        let label = Label::from_class(self.classifier.predict(&input)?)?;

        Ok(Prediction::new(label, proba))
    }

    /// Classify a derived feature vector.
    ///
    /// # Errors
    /// Same as `predict_row`.
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        self.predict_row(&features.to_vec())
    }

    /// Full pipeline for one form submission.
    ///
    /// # Errors
    /// Same as `predict_row`.
    pub fn assess(&self, habits: &DailyHabits) -> Result<Assessment, ModelError> {
        let features = FeatureVector::derive(habits);
        tracing::debug!(
            "Derived features: productivity_ratio={:.4}, sleep_deficit={:.2}, stress_index={:.4}",
            features.productivity_ratio,
            features.sleep_deficit,
            features.stress_index
        );

        let prediction = self.predict(&features)?;
        tracing::info!(
            "Prediction complete: label={}, probability={:.2}",
            prediction.label,
            prediction.probability
        );

        Ok(Assessment::new(features, prediction))
    }
}
