//! UI module: View components for the TUI.

pub mod habits;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::FocusTheme;

pub fn render_header(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled(" Procrastination Predictor ", FocusTheme::header())),
        Line::from(Span::styled(
            " Predict the likelihood of procrastination based on your daily habits.",
            FocusTheme::text_secondary(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(FocusTheme::border());

    f.render_widget(Paragraph::new(text).block(block), area);
}

/// Key hints, or the pending error if there is one.
pub fn render_footer(f: &mut Frame, area: Rect, error: Option<&str>) {
    let content = if let Some(error) = error {
        Line::from(Span::styled(error, FocusTheme::danger()))
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", FocusTheme::key_hint()),
            Span::styled("Select ", FocusTheme::key_desc()),
            Span::styled("[←→] ", FocusTheme::key_hint()),
            Span::styled("Adjust ", FocusTheme::key_desc()),
            Span::styled("[Home/End] ", FocusTheme::key_hint()),
            Span::styled("Min/Max ", FocusTheme::key_desc()),
            Span::styled("[Enter] ", FocusTheme::key_hint()),
            Span::styled("Predict ", FocusTheme::key_desc()),
            Span::styled("[R] ", FocusTheme::key_hint()),
            Span::styled("Reset ", FocusTheme::key_desc()),
            Span::styled("[Q] ", FocusTheme::key_hint()),
            Span::styled("Quit", FocusTheme::key_desc()),
        ])
    };

    let text = vec![
        content,
        Line::from(Span::styled(
            "Estimates come from a statistical model trained on self-reported habits.",
            FocusTheme::text_muted(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(FocusTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
