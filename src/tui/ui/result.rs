//! Prediction result panel.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::Assessment;
use crate::tui::styles::FocusTheme;

/// Result panel state
#[derive(Debug, Clone, Default)]
pub enum ResultState {
    /// Nothing predicted yet
    #[default]
    Idle,
    /// Completed with result
    Complete { assessment: Box<Assessment> },
    /// Prediction failed
    Error { message: String },
}

/// Render the result panel
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    match state {
        ResultState::Idle => render_idle(f, area),
        ResultState::Complete { assessment } => render_assessment(f, area, assessment),
        ResultState::Error { message } => render_error(f, area, message),
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Adjust the sliders to describe your day",
            FocusTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to predict",
            FocusTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(Span::styled(" Prediction ", FocusTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(FocusTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_assessment(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let block = Block::default()
        .title(Span::styled(" Prediction ", FocusTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(FocusTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Headline
            Constraint::Length(3), // Probability
            Constraint::Length(4), // Derived features
            Constraint::Min(0),    // Advice
        ])
        .margin(1)
        .split(inner);

    let prediction = &assessment.prediction;
    let label_style = FocusTheme::label(prediction.label);

    let headline = Paragraph::new(Line::from(Span::styled(
        assessment.advice.headline.clone(),
        label_style.add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(headline, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Procrastination Probability ",
                    FocusTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(FocusTheme::border()),
        )
        .gauge_style(label_style)
        .ratio(prediction.probability.clamp(0.0, 1.0))
        .label(format!("{:.2}", prediction.probability));
    f.render_widget(gauge, chunks[1]);

    let features = &assessment.features;
    let derived = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Productivity ratio: ", FocusTheme::text_secondary()),
            Span::styled(format!("{:.2}", features.productivity_ratio), FocusTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("Sleep deficit: ", FocusTheme::text_secondary()),
            Span::styled(format!("{:.1} h", features.sleep_deficit), FocusTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("Stress index: ", FocusTheme::text_secondary()),
            Span::styled(format!("{:.2}", features.stress_index), FocusTheme::text()),
        ]),
        Line::from(Span::styled(
            format!(
                "Predicted at {}",
                assessment.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            FocusTheme::text_muted(),
        )),
    ]);
    f.render_widget(derived, chunks[2]);

    let mut lines = vec![Line::from(Span::styled(
        assessment.advice.section_title.clone(),
        FocusTheme::subtitle(),
    ))];
    lines.extend(assessment.advice.tips.iter().map(|tip| {
        Line::from(vec![
            Span::styled(" - ", FocusTheme::text_muted()),
            Span::styled(tip.clone(), FocusTheme::text()),
        ])
    }));
    let advice = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(advice, chunks[3]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", FocusTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, FocusTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Prediction ", FocusTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(FocusTheme::danger()),
    );

    f.render_widget(content, area);
}
