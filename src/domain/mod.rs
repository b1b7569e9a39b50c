//! Domain layer: Core types and pure logic.
//!
//! Nothing in here touches the filesystem, the terminal or the model
//! artifacts. Raw inputs are validated at construction and every function is
//! deterministic.

pub mod advice;
pub mod features;
pub mod habits;
mod prediction;

pub use advice::Advice;
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use habits::{DailyHabits, HabitError, HabitSpec, HABIT_SPECS};
pub use prediction::{Assessment, Label, ModelError, Prediction};
