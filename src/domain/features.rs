//! Feature vector consumed by the classifier.
//!
//! Seven raw habit values plus three derived features, in the column order the
//! model was trained on.

use serde::{Deserialize, Serialize};

use super::habits::DailyHabits;
use super::ModelError;

/// Guard added to denominators so the derived features stay finite.
pub const EPSILON: f64 = 1e-6;

/// Sleep target used for `sleep_deficit`.
pub const TARGET_SLEEP_HOURS: f64 = 8.0;

/// Number of columns in the feature vector.
pub const FEATURE_COUNT: usize = 10;

/// Column names in training order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "sleep_hours",
    "phone_usage_hours",
    "caffeine_intake",
    "tasks_planned",
    "tasks_completed",
    "mood_level",
    "social_media_time",
    "productivity_ratio",
    "sleep_deficit",
    "stress_index",
];

/// The ten-column model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub sleep_hours: f64,
    pub phone_usage_hours: f64,
    pub caffeine_intake: f64,
    pub tasks_planned: f64,
    pub tasks_completed: f64,
    pub mood_level: f64,
    pub social_media_time: f64,
    pub productivity_ratio: f64,
    pub sleep_deficit: f64,
    pub stress_index: f64,
}

impl FeatureVector {
    /// Derive the full vector from validated habits.
    #[must_use]
    pub fn derive(habits: &DailyHabits) -> Self {
        let sleep_hours = habits.sleep_hours.get();
        let phone_usage_hours = habits.phone_usage_hours.get();
        let tasks_planned = f64::from(habits.tasks_planned.get());
        let tasks_completed = f64::from(habits.tasks_completed.get());
        let mood_level = f64::from(habits.mood_level.get());
        let social_media_time = f64::from(habits.social_media_time.get());

        Self {
            sleep_hours,
            phone_usage_hours,
            caffeine_intake: f64::from(habits.caffeine_intake.get()),
            tasks_planned,
            tasks_completed,
            mood_level,
            social_media_time,
            productivity_ratio: productivity_ratio(tasks_completed, tasks_planned),
            sleep_deficit: sleep_deficit(sleep_hours),
            stress_index: stress_index(phone_usage_hours, social_media_time, mood_level),
        }
    }

    /// Columns in `FEATURE_NAMES` order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.to_array().to_vec()
    }

    #[must_use]
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.sleep_hours,
            self.phone_usage_hours,
            self.caffeine_intake,
            self.tasks_planned,
            self.tasks_completed,
            self.mood_level,
            self.social_media_time,
            self.productivity_ratio,
            self.sleep_deficit,
            self.stress_index,
        ]
    }
}

/// Reject vectors the classifier cannot consume.
///
/// # Errors
/// Returns `ModelError::InvalidInput` on wrong arity or a non-finite column.
pub fn check_columns(v: &[f64]) -> Result<(), ModelError> {
    if v.len() != FEATURE_COUNT {
        return Err(ModelError::InvalidInput(format!(
            "Expected {FEATURE_COUNT} features, got {}",
            v.len()
        )));
    }
    if let Some((i, x)) = v.iter().enumerate().find(|(_, x)| !x.is_finite()) {
        return Err(ModelError::InvalidInput(format!(
            "Feature {} is not a finite number ({x})",
            FEATURE_NAMES[i]
        )));
    }
    Ok(())
}

/// `completed / (planned + ε)`.
#[must_use]
pub fn productivity_ratio(tasks_completed: f64, tasks_planned: f64) -> f64 {
    tasks_completed / (tasks_planned + EPSILON)
}

/// Distance from an eight-hour night.
#[must_use]
pub fn sleep_deficit(sleep_hours: f64) -> f64 {
    (sleep_hours - TARGET_SLEEP_HOURS).abs()
}

/// Screen time in hours, scaled down by mood.
#[must_use]
pub fn stress_index(phone_usage_hours: f64, social_media_minutes: f64, mood_level: f64) -> f64 {
    (phone_usage_hours + social_media_minutes / 60.0) / (mood_level + EPSILON)
}
