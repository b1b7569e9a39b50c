//! Canned feedback shown under a prediction.

use serde::{Deserialize, Serialize};

use super::prediction::{Label, Prediction};

const PROCRASTINATING_TIPS: [&str; 4] = [
    "Get at least 7–8 hours of quality sleep.",
    "Reduce phone and social media usage during work hours.",
    "Plan fewer but achievable tasks.",
    "Maintain a positive mood with breaks and hydration.",
];

const PRODUCTIVE_TIPS: [&str; 4] = [
    "Maintain consistent sleep schedule.",
    "Continue completing planned tasks.",
    "Avoid distractions when possible.",
    "Track your habits daily to stay productive!",
];

/// Message template for one label, with the probability already formatted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub label: Label,
    pub headline: String,
    pub section_title: String,
    pub tips: Vec<String>,
}

impl Advice {
    /// Select the template for `label`.
    ///
    /// `probability` is always the procrastinating-class probability, for
    /// both variants, and is rendered with two decimals.
    #[must_use]
    pub fn for_label(label: Label, probability: f64) -> Self {
        let (headline, section_title, tips) = match label {
            Label::Procrastinating => (
                format!("You are likely Procrastinating! (Probability: {probability:.2})"),
                "Tips to Improve",
                PROCRASTINATING_TIPS,
            ),
            Label::Productive => (
                format!("You seem Productive! (Probability: {probability:.2})"),
                "Keep It Up",
                PRODUCTIVE_TIPS,
            ),
        };

        Self {
            label,
            headline,
            section_title: section_title.to_string(),
            tips: tips.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn for_prediction(prediction: &Prediction) -> Self {
        Self::for_label(prediction.label, prediction.probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procrastinating_message() {
        let advice = Advice::for_label(Label::Procrastinating, 0.876);
        assert_eq!(
            advice.headline,
            "You are likely Procrastinating! (Probability: 0.88)"
        );
        assert_eq!(advice.section_title, "Tips to Improve");
        assert_eq!(advice.tips.len(), 4);
        assert!(advice.tips[2].contains("fewer but achievable"));
    }

    #[test]
    fn test_productive_message_shows_positive_class_probability() {
        let advice = Advice::for_prediction(&Prediction::new(Label::Productive, [0.9, 0.1]));
        assert_eq!(advice.headline, "You seem Productive! (Probability: 0.10)");
        assert_eq!(advice.section_title, "Keep It Up");
        assert_eq!(advice.tips.len(), 4);
    }

    #[test]
    fn test_selection_is_pure() {
        assert_eq!(
            Advice::for_label(Label::Productive, 0.25),
            Advice::for_label(Label::Productive, 0.25)
        );
    }
}
