//! Color palette and preset styles.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::Label;

/// Application theme.
pub struct FocusTheme;

impl FocusTheme {
    // === Primary Colors ===

    /// Indigo - Primary color
    pub const PRIMARY: Color = Color::Rgb(99, 102, 241); // #6366F1

    /// Lighter indigo for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(165, 180, 252); // #A5B4FC

    /// Darker indigo for the header bar
    pub const PRIMARY_DARK: Color = Color::Rgb(67, 56, 202); // #4338CA

    /// Light slate for borders
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic Colors ===

    /// Emerald - Productive
    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981

    /// Rose - Procrastinating / errors
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E

    // === Text Colors ===

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    /// Style for focused elements
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn header() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    /// Filled part of a slider
    #[must_use]
    pub fn slider(selected: bool) -> Style {
        if selected {
            Style::default().fg(Self::PRIMARY)
        } else {
            Style::default().fg(Self::TEXT_MUTED)
        }
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Style for a predicted label
    #[must_use]
    pub fn label(label: Label) -> Style {
        match label {
            Label::Productive => Self::success(),
            Label::Procrastinating => Self::danger(),
        }
    }
}
