//! Habit input form: seven bounded sliders.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::domain::{DailyHabits, HabitError, HabitSpec, HABIT_SPECS};
use crate::tui::styles::FocusTheme;

/// One slider: its static spec and current value.
#[derive(Debug, Clone)]
pub struct Slider {
    pub spec: &'static HabitSpec,
    pub value: f64,
}

impl Slider {
    fn new(spec: &'static HabitSpec) -> Self {
        Self {
            spec,
            value: spec.default,
        }
    }

    /// Fraction of the range covered, for the gauge.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        ((self.value - self.spec.min) / (self.spec.max - self.spec.min)).clamp(0.0, 1.0)
    }

    /// Current value with its unit, e.g. `7.5 h` or `60 min`.
    #[must_use]
    pub fn display_value(&self) -> String {
        let number = if self.spec.integer {
            format!("{:.0}", self.value)
        } else {
            format!("{:.1}", self.value)
        };
        if self.spec.unit.is_empty() {
            number
        } else {
            format!("{number} {}", self.spec.unit)
        }
    }
}

/// Habit form state
pub struct HabitFormState {
    pub sliders: Vec<Slider>,
    pub selected: usize,
    pub error_message: Option<String>,
}

impl Default for HabitFormState {
    fn default() -> Self {
        Self {
            sliders: HABIT_SPECS.iter().map(Slider::new).collect(),
            selected: 0,
            error_message: None,
        }
    }
}

impl HabitFormState {
    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % self.sliders.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected == 0 {
            self.selected = self.sliders.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    /// Move the selected slider by `steps` notches, clamped to its range.
    pub fn nudge(&mut self, steps: i32) {
        let slider = &mut self.sliders[self.selected];
        let target = slider.value + f64::from(steps) * slider.spec.step;
        slider.value = slider.spec.snap(target);
        self.error_message = None;
    }

    pub fn set_min(&mut self) {
        let slider = &mut self.sliders[self.selected];
        slider.value = slider.spec.min;
        self.error_message = None;
    }

    pub fn set_max(&mut self) {
        let slider = &mut self.sliders[self.selected];
        slider.value = slider.spec.max;
        self.error_message = None;
    }

    /// Restore every slider to its default.
    pub fn reset(&mut self) {
        *self = Self {
            selected: self.selected,
            ..Self::default()
        };
    }

    /// Validate the current values.
    ///
    /// # Errors
    /// Returns the first out-of-domain value.
    pub fn to_habits(&self) -> Result<DailyHabits, HabitError> {
        let values: Vec<f64> = self.sliders.iter().map(|s| s.value).collect();
        DailyHabits::from_values(&values)
    }
}

/// Render the form
pub fn render_habit_form(f: &mut Frame, area: Rect, state: &HabitFormState) {
    let block = Block::default()
        .title(Span::styled(" Enter Your Daily Stats ", FocusTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(FocusTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let constraints: Vec<Constraint> = state
        .sliders
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, slider) in state.sliders.iter().enumerate() {
        render_slider(f, rows[i], slider, i == state.selected);
    }
}

fn render_slider(f: &mut Frame, area: Rect, slider: &Slider, selected: bool) {
    let title_style = if selected {
        FocusTheme::focused()
    } else {
        FocusTheme::text_secondary()
    };
    let border_style = if selected {
        FocusTheme::border_focused()
    } else {
        FocusTheme::border()
    };

    let title = Line::from(vec![
        Span::styled(format!(" {} ", slider.spec.label), title_style),
        Span::styled(
            format!("[{}-{}] ", slider.spec.min, slider.spec.max),
            FocusTheme::text_muted(),
        ),
    ]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .gauge_style(FocusTheme::slider(selected))
        .ratio(slider.ratio())
        .label(Span::styled(slider.display_value(), FocusTheme::text()));

    f.render_widget(gauge, area);
}
