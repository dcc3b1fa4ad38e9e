//! Volume HUD overlay.

use crate::tui::surface::HudView;
use crate::tui::theme::get_theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const WIDTH: u16 = 10;
const HEIGHT: u16 = 3;

/// Over the player panel, `offset` rows below its top edge.
pub fn render_over_video(frame: &mut Frame, hud: &HudView, player: Rect) {
    if !hud.visible || player.width < WIDTH || player.height < HEIGHT {
        return;
    }
    let max_y = player.bottom() - HEIGHT;
    let area = Rect {
        x: player.x + (player.width - WIDTH) / 2,
        y: (player.y + hud.offset).min(max_y),
        width: WIDTH,
        height: HEIGHT,
    };
    render_box(frame, &hud.text, area);
}

/// Right side of the nav bar, used when the video panel is hidden.
pub fn render_in_nav(frame: &mut Frame, hud: &HudView, nav: Rect) {
    if !hud.visible || nav.width < WIDTH + 2 || nav.height < HEIGHT {
        return;
    }
    let area = Rect {
        x: nav.right() - WIDTH - 1,
        y: nav.y,
        width: WIDTH,
        height: HEIGHT,
    };
    render_box(frame, &hud.text, area);
}

fn render_box(frame: &mut Frame, text: &str, area: Rect) {
    let theme = get_theme();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.accent))
        .style(Style::default().bg(theme.palette.bg_highlight));
    let content = Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(theme.palette.fg_primary)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(Clear, area);
    frame.render_widget(content, area);
}
