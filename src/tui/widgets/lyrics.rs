//! Lyrics pane.

use crate::app::state::AppState;
use crate::tui::theme::get_theme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} Lyrics ", icons.lyrics))
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Horizontal padding
    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner)[1];

    let pane = &state.lyrics;
    let Some(text) = pane.text.as_deref() else {
        let msg = if pane.loading {
            format!("{} Searching...", icons.loading)
        } else if state.track.is_some() {
            "No lyrics found".to_string()
        } else {
            "No lyrics available".to_string()
        };
        let content = Line::from(Span::styled(msg, Style::default().fg(theme.palette.fg_secondary)));
        frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), padded);
        return;
    };

    let lines: Vec<Line> = text
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(theme.palette.fg_primary))))
        .collect();
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((pane.scroll, 0));
    frame.render_widget(paragraph, padded);
}
