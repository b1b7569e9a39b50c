//! # Procrastination Predictor
//!
//! Predicts whether a day's habits point to procrastination, using a
//! pre-trained random-forest classifier.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Habit inputs, feature derivation, predictions, advice
//! - `ports`: Trait definitions for the classifier and scaler
//! - `adapters`: Concrete model implementation loaded from JSON exports
//! - `application`: The prediction use case
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Assessment, DailyHabits, FeatureVector, Label, Prediction};

/// Result type for predictor operations
pub type Result<T> = std::result::Result<T, PredictorError>;

/// Main error type for the predictor
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("Invalid habit data: {0}")]
    Habit(#[from] domain::HabitError),

    #[error(transparent)]
    Model(#[from] domain::ModelError),

    #[error("Configuration error: {0}")]
    Config(String),
}
