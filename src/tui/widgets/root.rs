//! Root layout widget - orchestrates main layout structure

use crate::app::state::{AppState, ToastKind};
use crate::tui::surface::TuiSurface;
use crate::tui::theme::get_theme;
use crate::volume::HudPlacement;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{help, hud, lyrics, player, volume_bar};

pub fn render(frame: &mut Frame, state: &AppState, surface: &TuiSurface) {
    let layout = *surface.layout();

    render_nav(frame, state, layout.nav);
    if let Some(area) = layout.player {
        player::render(frame, state, area, layout.video);
    }
    lyrics::render(frame, state, layout.lyrics);
    volume_bar::render(frame, state, surface, layout.bar, layout.slider);

    // HUD goes on top of whatever it is placed over.
    match surface.hud().placement {
        Some(HudPlacement::Video) => {
            if let Some(area) = layout.player {
                hud::render_over_video(frame, surface.hud(), area);
            }
        }
        Some(HudPlacement::NavBar) => hud::render_in_nav(frame, surface.hud(), layout.nav),
        None => {}
    }

    if state.show_help {
        help::render(frame, frame.area());
    }
}

fn render_nav(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = vec![
        Span::styled(
            format!(" {} void-plugins", icons.music),
            Style::default()
                .fg(theme.palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("? keys", Style::default().fg(theme.palette.fg_secondary)),
    ];
    if let Some(toast) = &state.toast
        && !toast.is_expired()
    {
        let (prefix, color) = match toast.kind {
            ToastKind::Success => (icons.success, theme.palette.playing),
            ToastKind::Error => (icons.error, theme.palette.error),
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} {}", prefix, toast.message),
            Style::default().fg(color),
        ));
    } else if !state.status.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            state.status.clone(),
            Style::default().fg(theme.palette.fg_secondary),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Left),
        inner,
    );
}
