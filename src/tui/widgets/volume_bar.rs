//! Bottom control bar with the volume slider and its tooltip.

use crate::app::state::AppState;
use crate::tui::surface::TuiSurface;
use crate::tui::theme::get_theme;
use crate::volume::TooltipTarget;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::truncate_str;

pub fn render(frame: &mut Frame, state: &AppState, surface: &TuiSurface, area: Rect, slider: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let border = if state.pointer_over_bar {
        theme.palette.accent_alt
    } else {
        theme.palette.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let value = surface.slider_value();
    let vol_icon = if value == 0 {
        icons.volume_mute
    } else if value < 50 {
        icons.volume_low
    } else {
        icons.volume_high
    };

    // Tooltip of the volume button, shown while the slider is expanded.
    let tooltip = surface
        .slider_expanded()
        .then(|| surface.tooltip(TooltipTarget::VolumeButton))
        .flatten()
        .unwrap_or("");
    let right_width = slider.width + 2 + tooltip.chars().count() as u16 + 2;
    let title_width = inner.width.saturating_sub(right_width + 1) as usize;

    let title = state.now_playing().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", truncate_str(&title, title_width)),
            Style::default().fg(theme.palette.fg_secondary),
        ))),
        Rect { height: 1, ..inner },
    );

    let label_x = slider.x.saturating_sub(tooltip.chars().count() as u16 + 3);
    let label = Line::from(vec![
        Span::styled(tooltip.to_string(), Style::default().fg(theme.palette.accent)),
        Span::raw(" "),
        Span::styled(vol_icon, Style::default().fg(theme.palette.fg_secondary)),
    ]);
    frame.render_widget(
        Paragraph::new(label),
        Rect {
            x: label_x.max(inner.x),
            y: slider.y,
            width: slider.x.saturating_sub(label_x.max(inner.x)),
            height: 1,
        },
    );

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            slider_bar(slider.width as usize, value, icons),
            Style::default().fg(theme.palette.accent),
        ))),
        slider,
    );
}

fn slider_bar(width: usize, value: u8, icons: &crate::tui::theme::Icons) -> String {
    if width < 3 {
        return String::new();
    }
    let ratio = value.min(100) as f64 / 100.0;
    let filled = ((width - 1) as f64 * ratio).round() as usize;
    let empty = width.saturating_sub(filled + 1);

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push_str(icons.progress_full);
    }
    bar.push_str(icons.progress_head);
    for _ in 0..empty {
        bar.push_str(icons.progress_empty);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::theme::Icons;

    #[test]
    fn test_slider_bar_positions_head() {
        let icons = Icons::nerd();
        assert_eq!(slider_bar(5, 0, &icons), "●────");
        assert_eq!(slider_bar(5, 100, &icons), "━━━━●");
        assert_eq!(slider_bar(5, 50, &icons), "━━●──");
        assert_eq!(slider_bar(2, 50, &icons), "");
    }
}
