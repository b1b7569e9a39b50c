//! Main TUI application state machine.
//!
//! Handles:
//! - Input event handling
//! - Service integration
//! - Rendering of the single predictor screen

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::forest::{load_artifacts, ForestClassifier, StandardScaler};
use crate::application::PredictionService;
use crate::config::Config;
use crate::domain::{Assessment, ModelError};

use super::ui::{
    habits::{render_habit_form, HabitFormState},
    render_footer, render_header,
    result::{render_result, ResultState},
};

type Service = PredictionService<ForestClassifier, StandardScaler>;

/// Shown in place of model errors; details go to the log.
const PREDICTION_FAILED: &str = "Prediction failed. Please check your inputs and try again.";

/// Main application state
pub struct App {
    /// Whether the app should quit
    should_quit: bool,

    /// Prediction service
    service: Service,

    /// Slider values
    form: HabitFormState,

    /// Last prediction outcome
    result: ResultState,
}

impl App {
    /// Load and verify the model artifacts, then build the application.
    ///
    /// # Errors
    /// Returns error if the artifacts are missing, fail verification, or do
    /// not fit the feature pipeline.
    pub fn new(config: &Config) -> crate::Result<Self> {
        let (forest, scaler) = load_artifacts(&config.model_dir, &config.artifact_policy)?;
        tracing::info!(
            "Loaded model from {:?} ({} trees)",
            config.model_dir,
            forest.n_trees()
        );

        let service = PredictionService::new(
            Arc::new(forest),
            Some(Arc::new(scaler)),
            config.scaler_policy,
        )?;

        Ok(Self::with_dependencies(service))
    }

    /// Create application with an injected service (Composition Root pattern).
    #[must_use]
    pub fn with_dependencies(service: Service) -> Self {
        Self {
            should_quit: false,
            service,
            form: HabitFormState::default(),
            result: ResultState::default(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Content
                Constraint::Length(3), // Footer
            ])
            .split(f.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        render_header(f, rows[0]);
        render_habit_form(f, columns[0], &self.form);
        render_result(f, columns[1], &self.result);
        render_footer(f, rows[2], self.form.error_message.as_deref());
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => self.form.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form.next_field(),
            KeyCode::Left => self.form.nudge(-1),
            KeyCode::Right => self.form.nudge(1),
            KeyCode::Home => self.form.set_min(),
            KeyCode::End => self.form.set_max(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.form.reset();
                self.result = ResultState::Idle;
            }
            KeyCode::Enter | KeyCode::Char('p') | KeyCode::Char('P') => self.submit(),
            _ => {}
        }
    }

    fn submit(&mut self) {
        let habits = match self.form.to_habits() {
            Ok(habits) => habits,
            Err(e) => {
                self.form.error_message = Some(e.to_string());
                return;
            }
        };
        self.form.error_message = None;

        self.result = result_state(self.service.assess(&habits));
    }
}

fn result_state(outcome: std::result::Result<Assessment, ModelError>) -> ResultState {
    match outcome {
        Ok(assessment) => ResultState::Complete {
            assessment: Box::new(assessment),
        },
        Err(e) => {
            tracing::error!("Prediction failed: {}", e);
            ResultState::Error {
                message: PREDICTION_FAILED.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::forest::{ExportedForest, ExportedScaler, ExportedTree};
    use crate::application::ScalerPolicy;
    use crate::domain::{Label, FEATURE_COUNT, FEATURE_NAMES};
    use ratatui::backend::TestBackend;

    /// Procrastinating when productivity_ratio <= 0.5.
    fn test_app() -> App {
        let names: Vec<String> = FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect();
        let forest = ForestClassifier::from_export(&ExportedForest {
            format_version: 1,
            feature_names: names.clone(),
            scaled_inputs: false,
            trees: vec![ExportedTree {
                children_left: vec![1, -1, -1],
                children_right: vec![2, -1, -1],
                feature: vec![7, -2, -2],
                threshold: vec![0.5, -2.0, -2.0],
                value: vec![vec![50.0, 50.0], vec![10.0, 30.0], vec![36.0, 4.0]],
            }],
        })
        .expect("forest");
        let scaler = StandardScaler::from_export(&ExportedScaler {
            feature_names: names,
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        })
        .expect("scaler");
        let service =
            PredictionService::new(Arc::new(forest), Some(Arc::new(scaler)), ScalerPolicy::Auto)
                .expect("service");
        App::with_dependencies(service)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_enter_predicts_from_sliders() {
        let mut app = test_app();

        // Defaults: 3 of 5 tasks done, ratio 0.6.
        press(&mut app, KeyCode::Enter);
        match &app.result {
            ResultState::Complete { assessment } => {
                assert_eq!(assessment.prediction.label, Label::Productive);
                assert!((assessment.prediction.probability - 0.1).abs() < 1e-12);
            }
            other => panic!("expected a result, got {other:?}"),
        }

        // Tasks completed down to 2, ratio 0.4.
        for _ in 0..4 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('p'));
        match &app.result {
            ResultState::Complete { assessment } => {
                assert_eq!(assessment.prediction.label, Label::Procrastinating);
                assert_eq!(
                    assessment.advice.headline,
                    "You are likely Procrastinating! (Probability: 0.75)"
                );
            }
            other => panic!("expected a result, got {other:?}"),
        }
    }

    #[test]
    fn test_reset_clears_result() {
        let mut app = test_app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('r'));
        assert!(matches!(app.result, ResultState::Idle));
        assert!((app.form.sliders[0].value - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let mut app = test_app();
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_renders_result_panel() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);

        let mut terminal = Terminal::new(TestBackend::new(140, 40)).expect("terminal");
        terminal.draw(|f| app.draw(f)).expect("draw");

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Procrastination Predictor"));
        assert!(text.contains("You seem Productive! (Probability: 0.10)"));
        assert!(text.contains("Keep It Up"));
        assert!(text.contains("Predicted at"));
    }

    #[test]
    fn test_model_errors_show_generic_message() {
        let state = result_state(Err(ModelError::InvalidInput(
            "Feature stress_index is not a finite number (NaN)".into(),
        )));
        match &state {
            ResultState::Error { message } => {
                assert_eq!(message, PREDICTION_FAILED);
                assert!(!message.contains("stress_index"));
            }
            other => panic!("expected an error, got {other:?}"),
        }

        let mut app = test_app();
        app.result = state;
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).expect("terminal");
        terminal.draw(|f| app.draw(f)).expect("draw");
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Prediction failed."));
        assert!(!text.contains("NaN"));
    }
}
