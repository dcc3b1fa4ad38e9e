//! Player panel: now playing text and the video area the HUD sits on.

use crate::app::state::AppState;
use crate::tui::theme::get_theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::truncate_str;

pub fn render(frame: &mut Frame, state: &AppState, area: Rect, video: Option<Rect>) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} Player ", icons.music))
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.saturating_sub(2) as usize;
    let title = state.now_playing().unwrap_or_else(|| "Not playing".to_string());
    let play_icon = if state.paused { icons.pause } else { icons.play };
    let header = Line::from(vec![
        Span::styled(format!(" {play_icon} "), Style::default().fg(theme.palette.playing)),
        Span::styled(
            truncate_str(&title, width.saturating_sub(3)),
            Style::default()
                .fg(theme.palette.fg_primary)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(header),
        Rect {
            height: inner.height.min(1),
            ..inner
        },
    );

    if let Some(video) = video
        && video.height > 0
    {
        let frame_block = Block::default()
            .style(Style::default().bg(theme.palette.bg_secondary));
        frame.render_widget(frame_block, video);
        let label = Paragraph::new(Line::from(Span::styled(
            icons.music,
            Style::default().fg(theme.palette.fg_secondary),
        )))
        .alignment(Alignment::Center);
        let mid = Rect {
            y: video.y + video.height / 2,
            height: 1,
            ..video
        };
        frame.render_widget(label, mid);
    }
}
