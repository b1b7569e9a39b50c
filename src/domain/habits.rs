//! Self-reported daily habit inputs.
//!
//! Each raw input is a newtype whose constructor enforces the domain the
//! form sliders expose, so the feature deriver can rely on its precondition
//! without knowing anything about the UI.

use serde::{Deserialize, Serialize};

/// Error raised when a raw habit value is outside its domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HabitError {
    #[error("{field}: {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field}: value must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field}: {value} must be a whole number")]
    NotInteger { field: &'static str, value: f64 },

    #[error("Expected {expected} habit values, got {got}")]
    Arity { expected: usize, got: usize },
}

/// Static description of one raw input: label, unit, bounds, slider step, default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HabitSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
    pub integer: bool,
}

impl HabitSpec {
    /// Clamp `value` into range and snap it to the slider step.
    #[must_use]
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }

    fn check(&self, value: f64) -> Result<f64, HabitError> {
        if !value.is_finite() {
            return Err(HabitError::NotFinite { field: self.name });
        }
        if !(self.min..=self.max).contains(&value) {
            return Err(HabitError::OutOfRange {
                field: self.name,
                value,
                min: self.min,
                max: self.max,
            });
        }
        if self.integer && value.fract() != 0.0 {
            return Err(HabitError::NotInteger {
                field: self.name,
                value,
            });
        }
        Ok(value)
    }
}

/// Number of raw habit inputs collected by the form.
pub const HABIT_COUNT: usize = 7;

/// Raw inputs in form order.
pub static HABIT_SPECS: [HabitSpec; HABIT_COUNT] = [
    HabitSpec {
        name: "sleep_hours",
        label: "Sleep Hours",
        unit: "h",
        min: 3.0,
        max: 12.0,
        step: 0.5,
        default: 7.0,
        integer: false,
    },
    HabitSpec {
        name: "phone_usage_hours",
        label: "Phone Usage",
        unit: "h",
        min: 0.0,
        max: 10.0,
        step: 0.5,
        default: 3.0,
        integer: false,
    },
    HabitSpec {
        name: "caffeine_intake",
        label: "Caffeine Intake",
        unit: "cups",
        min: 0.0,
        max: 10.0,
        step: 1.0,
        default: 2.0,
        integer: true,
    },
    HabitSpec {
        name: "tasks_planned",
        label: "Tasks Planned",
        unit: "",
        min: 1.0,
        max: 15.0,
        step: 1.0,
        default: 5.0,
        integer: true,
    },
    HabitSpec {
        name: "tasks_completed",
        label: "Tasks Completed",
        unit: "",
        min: 0.0,
        max: 15.0,
        step: 1.0,
        default: 3.0,
        integer: true,
    },
    HabitSpec {
        name: "mood_level",
        label: "Mood Level (1 = Bad, 10 = Excellent)",
        unit: "",
        min: 1.0,
        max: 10.0,
        step: 1.0,
        default: 6.0,
        integer: true,
    },
    HabitSpec {
        name: "social_media_time",
        label: "Social Media Time",
        unit: "min",
        min: 0.0,
        max: 300.0,
        step: 5.0,
        default: 60.0,
        integer: true,
    },
];

static SLEEP: &HabitSpec = &HABIT_SPECS[0];
static PHONE: &HabitSpec = &HABIT_SPECS[1];
static CAFFEINE: &HabitSpec = &HABIT_SPECS[2];
static PLANNED: &HabitSpec = &HABIT_SPECS[3];
static COMPLETED: &HabitSpec = &HABIT_SPECS[4];
static MOOD: &HabitSpec = &HABIT_SPECS[5];
static SOCIAL: &HabitSpec = &HABIT_SPECS[6];

/// Hours slept last night, [3, 12].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SleepHours(f64);

impl SleepHours {
    /// # Errors
    /// Returns `HabitError` if `hours` is not finite or outside [3, 12].
    pub fn new(hours: f64) -> Result<Self, HabitError> {
        SLEEP.check(hours).map(Self)
    }

    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

/// Hours of phone use, [0, 10].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PhoneUsageHours(f64);

impl PhoneUsageHours {
    /// # Errors
    /// Returns `HabitError` if `hours` is not finite or outside [0, 10].
    pub fn new(hours: f64) -> Result<Self, HabitError> {
        PHONE.check(hours).map(Self)
    }

    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

/// Cups of coffee (or equivalent), [0, 10].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaffeineIntake(u8);

impl CaffeineIntake {
    /// # Errors
    /// Returns `HabitError::OutOfRange` if `cups > 10`.
    pub fn new(cups: u8) -> Result<Self, HabitError> {
        CAFFEINE.check(f64::from(cups)).map(|_| Self(cups))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Tasks planned for the day, [1, 15].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TasksPlanned(u8);

impl TasksPlanned {
    /// # Errors
    /// Returns `HabitError::OutOfRange` if `tasks` is 0 or above 15.
    pub fn new(tasks: u8) -> Result<Self, HabitError> {
        PLANNED.check(f64::from(tasks)).map(|_| Self(tasks))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Tasks actually completed, [0, 15].
///
/// Not bounded by `TasksPlanned`: finishing unplanned work is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TasksCompleted(u8);

impl TasksCompleted {
    /// # Errors
    /// Returns `HabitError::OutOfRange` if `tasks > 15`.
    pub fn new(tasks: u8) -> Result<Self, HabitError> {
        COMPLETED.check(f64::from(tasks)).map(|_| Self(tasks))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Self-rated mood, 1 (bad) to 10 (excellent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MoodLevel(u8);

impl MoodLevel {
    /// # Errors
    /// Returns `HabitError::OutOfRange` if `level` is outside [1, 10].
    pub fn new(level: u8) -> Result<Self, HabitError> {
        MOOD.check(f64::from(level)).map(|_| Self(level))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Minutes spent on social media, [0, 300].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SocialMediaMinutes(u16);

impl SocialMediaMinutes {
    /// # Errors
    /// Returns `HabitError::OutOfRange` if `minutes > 300`.
    pub fn new(minutes: u16) -> Result<Self, HabitError> {
        SOCIAL.check(f64::from(minutes)).map(|_| Self(minutes))
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }
}

/// One day's worth of validated raw inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyHabits {
    pub sleep_hours: SleepHours,
    pub phone_usage_hours: PhoneUsageHours,
    pub caffeine_intake: CaffeineIntake,
    pub tasks_planned: TasksPlanned,
    pub tasks_completed: TasksCompleted,
    pub mood_level: MoodLevel,
    pub social_media_time: SocialMediaMinutes,
}

impl DailyHabits {
    /// Build from raw numbers in form order (see `HABIT_SPECS`).
    ///
    /// # Errors
    /// Returns the first `HabitError` encountered.
    pub fn from_values(values: &[f64]) -> Result<Self, HabitError> {
        if values.len() != HABIT_COUNT {
            return Err(HabitError::Arity {
                expected: HABIT_COUNT,
                got: values.len(),
            });
        }
        for (spec, &value) in HABIT_SPECS.iter().zip(values) {
            spec.check(value)?;
        }

        // Every integer field has been range-checked above, so the casts are lossless.
        Ok(Self {
            sleep_hours: SleepHours::new(values[0])?,
            phone_usage_hours: PhoneUsageHours::new(values[1])?,
            caffeine_intake: CaffeineIntake::new(values[2] as u8)?,
            tasks_planned: TasksPlanned::new(values[3] as u8)?,
            tasks_completed: TasksCompleted::new(values[4] as u8)?,
            mood_level: MoodLevel::new(values[5] as u8)?,
            social_media_time: SocialMediaMinutes::new(values[6] as u16)?,
        })
    }

    /// Raw values in form order.
    #[must_use]
    pub fn to_values(&self) -> [f64; HABIT_COUNT] {
        [
            self.sleep_hours.get(),
            self.phone_usage_hours.get(),
            f64::from(self.caffeine_intake.get()),
            f64::from(self.tasks_planned.get()),
            f64::from(self.tasks_completed.get()),
            f64::from(self.mood_level.get()),
            f64::from(self.social_media_time.get()),
        ]
    }
}

impl Default for DailyHabits {
    fn default() -> Self {
        Self {
            sleep_hours: SleepHours(SLEEP.default),
            phone_usage_hours: PhoneUsageHours(PHONE.default),
            caffeine_intake: CaffeineIntake(2),
            tasks_planned: TasksPlanned(5),
            tasks_completed: TasksCompleted(3),
            mood_level: MoodLevel(6),
            social_media_time: SocialMediaMinutes(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_enforced() {
        assert!(SleepHours::new(3.0).is_ok());
        assert!(SleepHours::new(12.0).is_ok());
        assert!(SleepHours::new(2.5).is_err());
        assert!(SleepHours::new(f64::NAN).is_err());
        assert!(PhoneUsageHours::new(10.5).is_err());
        assert!(CaffeineIntake::new(11).is_err());
        assert!(TasksPlanned::new(0).is_err());
        assert!(TasksCompleted::new(15).is_ok());
        assert!(MoodLevel::new(0).is_err());
        assert!(SocialMediaMinutes::new(301).is_err());
    }

    #[test]
    fn test_out_of_range_reports_field() {
        let err = MoodLevel::new(11).expect_err("must fail");
        assert_eq!(
            err,
            HabitError::OutOfRange {
                field: "mood_level",
                value: 11.0,
                min: 1.0,
                max: 10.0,
            }
        );
    }

    #[test]
    fn test_from_values() {
        let habits =
            DailyHabits::from_values(&[7.0, 3.0, 2.0, 5.0, 3.0, 6.0, 60.0]).expect("valid");
        assert_eq!(habits, DailyHabits::default());
        assert_eq!(habits.to_values(), [7.0, 3.0, 2.0, 5.0, 3.0, 6.0, 60.0]);
    }

    #[test]
    fn test_from_values_rejects_bad_input() {
        assert!(matches!(
            DailyHabits::from_values(&[7.0, 3.0]),
            Err(HabitError::Arity { expected: 7, got: 2 })
        ));
        assert!(matches!(
            DailyHabits::from_values(&[7.0, 3.0, 2.5, 5.0, 3.0, 6.0, 60.0]),
            Err(HabitError::NotInteger { field: "caffeine_intake", .. })
        ));
        assert!(matches!(
            DailyHabits::from_values(&[7.0, 3.0, 2.0, 5.0, 3.0, 6.0, 400.0]),
            Err(HabitError::OutOfRange { field: "social_media_time", .. })
        ));
    }

    #[test]
    fn test_defaults_match_specs() {
        let defaults: Vec<f64> = HABIT_SPECS.iter().map(|s| s.default).collect();
        assert_eq!(DailyHabits::default().to_values().to_vec(), defaults);
    }

    #[test]
    fn test_snap() {
        let sleep = &HABIT_SPECS[0];
        assert!((sleep.snap(7.3) - 7.5).abs() < f64::EPSILON);
        assert!((sleep.snap(1.0) - 3.0).abs() < f64::EPSILON);
        assert!((sleep.snap(99.0) - 12.0).abs() < f64::EPSILON);

        let social = &HABIT_SPECS[6];
        assert!((social.snap(62.0) - 60.0).abs() < f64::EPSILON);
    }
}
