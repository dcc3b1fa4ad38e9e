//! Screen areas, shared by rendering and mouse hit-testing.

use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

const SLIDER_COLLAPSED: u16 = 10;
const SLIDER_EXPANDED: u16 = 26;

/// ┌──────────────────────────────────────────────┐
/// │ nav                                   [HUD]  │
/// ├─────────────────────────┬────────────────────┤
/// │ player                  │ lyrics             │
/// │   ┌─video──────────┐    │                    │
/// │   └────────────────┘    │                    │
/// ├─────────────────────────┴────────────────────┤
/// │ bar: title                    vol ──●──────  │
/// └──────────────────────────────────────────────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenLayout {
    pub nav: Rect,
    pub player: Option<Rect>,
    pub video: Option<Rect>,
    pub lyrics: Rect,
    pub bar: Rect,
    pub slider: Rect,
}

impl ScreenLayout {
    pub fn compute(area: Rect, show_video_panel: bool, slider_expanded: bool) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Nav
                Constraint::Min(6),    // Player + lyrics
                Constraint::Length(3), // Control bar
            ])
            .split(area);

        let (player, lyrics) = if show_video_panel {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(rows[1]);
            (Some(cols[0]), cols[1])
        } else {
            (None, rows[1])
        };

        let video = player.map(video_rect);

        let bar = rows[2];
        let bar_inner = inset(bar);
        let width = if slider_expanded {
            SLIDER_EXPANDED
        } else {
            SLIDER_COLLAPSED
        }
        .min(bar_inner.width);
        let slider = Rect {
            x: bar_inner.right().saturating_sub(width),
            y: bar_inner.y,
            width,
            height: bar_inner.height.min(1),
        };

        Self {
            nav: rows[0],
            player,
            video,
            lyrics,
            bar,
            slider,
        }
    }

    pub fn in_player(&self, col: u16, row: u16) -> bool {
        self.player
            .is_some_and(|p| p.contains(Position::new(col, row)))
    }

    pub fn in_bar(&self, col: u16, row: u16) -> bool {
        self.bar.contains(Position::new(col, row))
    }

    pub fn in_lyrics(&self, col: u16, row: u16) -> bool {
        self.lyrics.contains(Position::new(col, row))
    }

    /// Slider value for a click at `col`, snapped to the slider's step of 5.
    pub fn slider_value_at(&self, col: u16, row: u16) -> Option<u8> {
        if !self.slider.contains(Position::new(col, row)) || self.slider.width < 2 {
            return None;
        }
        let pos = (col - self.slider.x) as u32;
        let span = (self.slider.width - 1) as u32;
        let raw = pos * 100 / span;
        Some((((raw + 2) / 5) * 5).min(100) as u8)
    }
}

fn inset(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// 16:9 box centred in the player panel; terminal cells are about twice as tall as wide.
fn video_rect(player: Rect) -> Rect {
    let inner = inset(player);
    let height = (inner.width as u32 * 9 / 32).min(inner.height as u32) as u16;
    Rect {
        x: inner.x,
        y: inner.y + (inner.height - height) / 2,
        width: inner.width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_is_centred_in_player() {
        let l = ScreenLayout::compute(Rect::new(0, 0, 100, 40), true, false);
        let player = l.player.unwrap();
        let video = l.video.unwrap();
        assert!(video.height < player.height);
        let above = video.y - player.y;
        let below = player.bottom() - video.bottom();
        assert!(above.abs_diff(below) <= 1);
    }

    #[test]
    fn test_without_video_panel_lyrics_fill_the_middle() {
        let l = ScreenLayout::compute(Rect::new(0, 0, 80, 24), false, false);
        assert_eq!(l.player, None);
        assert_eq!(l.video, None);
        assert_eq!(l.lyrics.width, 80);
        assert!(!l.in_player(10, 10));
        assert!(l.in_lyrics(10, 10));
    }

    #[test]
    fn test_slider_grows_when_expanded() {
        let collapsed = ScreenLayout::compute(Rect::new(0, 0, 80, 24), true, false);
        let expanded = ScreenLayout::compute(Rect::new(0, 0, 80, 24), true, true);
        assert_eq!(collapsed.slider.width, SLIDER_COLLAPSED);
        assert_eq!(expanded.slider.width, SLIDER_EXPANDED);
        assert_eq!(collapsed.slider.right(), expanded.slider.right());
        assert!(expanded.in_bar(expanded.slider.x, expanded.slider.y));
    }

    #[test]
    fn test_slider_click_snaps_to_five() {
        let l = ScreenLayout::compute(Rect::new(0, 0, 80, 24), true, true);
        let s = l.slider;
        assert_eq!(l.slider_value_at(s.x, s.y), Some(0));
        assert_eq!(l.slider_value_at(s.right() - 1, s.y), Some(100));
        let mid = l.slider_value_at(s.x + s.width / 2, s.y).unwrap();
        assert_eq!(mid % 5, 0);
        assert_eq!(l.slider_value_at(s.x, s.y + 1), None);
    }
}
