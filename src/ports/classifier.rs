//! Classifier port: Traits for the pre-trained model and its scaler.
//!
//! These traits keep the application layer independent of the artifact
//! format, so tests can swap in fixed-output models.

use crate::domain::ModelError;

/// Binary classifier over the ten-column feature vector.
///
/// Implementations are immutable after loading and must be deterministic:
/// the same input always yields the same output.
pub trait Classifier: Send + Sync {
    /// Number of columns the model expects.
    fn n_features(&self) -> usize;

    /// Whether the model was trained on scaled features.
    fn expects_scaled_inputs(&self) -> bool;

    /// Class probabilities `[p0, p1]` for one row.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidInput` if the row has the wrong arity or
    /// contains non-finite values.
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], ModelError>;

    /// Predicted class (0 or 1) for one row.
    ///
    /// Defaults to the argmax of `predict_proba`, ties going to class 0.
    ///
    /// # Errors
    /// Same as `predict_proba`.
    fn predict(&self, features: &[f64]) -> Result<u8, ModelError> {
        let [p0, p1] = self.predict_proba(features)?;
        Ok(u8::from(p1 > p0))
    }
}

/// Feature normalization fitted alongside the classifier.
pub trait Scaler: Send + Sync {
    /// Normalize one row.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidInput` on an arity mismatch.
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}
