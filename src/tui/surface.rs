//! Terminal rendering surface for the volume controller.
//!
//! The controller writes view state here; widgets read it on the next draw.

use std::collections::HashMap;

use super::layout::ScreenLayout;
use crate::volume::{HudPlacement, Lookup, PlayerGeometry, Surface, TooltipTarget};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudView {
    pub text: String,
    pub visible: bool,
    pub placement: Option<HudPlacement>,
    /// Rows below the top of the player panel.
    pub offset: u16,
}

#[derive(Debug, Default)]
pub struct TuiSurface {
    show_video_panel: bool,
    layout: ScreenLayout,
    hud: HudView,
    tooltips: HashMap<TooltipTarget, String>,
    slider_value: u8,
    slider_expanded: bool,
}

impl TuiSurface {
    pub fn new(show_video_panel: bool) -> Self {
        Self {
            show_video_panel,
            ..Self::default()
        }
    }

    pub fn show_video_panel(&self) -> bool {
        self.show_video_panel
    }

    /// Areas of the last draw.
    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: ScreenLayout) {
        self.layout = layout;
    }

    pub fn hud(&self) -> &HudView {
        &self.hud
    }

    pub fn tooltip(&self, target: TooltipTarget) -> Option<&str> {
        self.tooltips.get(&target).map(String::as_str)
    }

    pub fn slider_value(&self) -> u8 {
        self.slider_value
    }

    pub fn slider_expanded(&self) -> bool {
        self.slider_expanded
    }
}

impl Surface for TuiSurface {
    fn main_panel_visible(&self) -> bool {
        self.show_video_panel
    }

    fn player_geometry(&self) -> Option<PlayerGeometry> {
        let player = self.layout.player?;
        let video = self.layout.video?;
        Some(PlayerGeometry {
            player_height: player.height as f32,
            video_height: video.height as f32,
        })
    }

    fn place_hud(&mut self, placement: HudPlacement) -> Lookup {
        self.hud.placement = Some(placement);
        Lookup::Found
    }

    fn show_hud(&mut self, text: &str) -> Lookup {
        self.hud.text = text.to_string();
        self.hud.visible = true;
        Lookup::Found
    }

    fn hide_hud(&mut self) -> Lookup {
        self.hud.visible = false;
        Lookup::Found
    }

    fn set_hud_offset(&mut self, top: f32) -> Lookup {
        self.hud.offset = top.round().clamp(0.0, u16::MAX as f32) as u16;
        Lookup::Found
    }

    fn set_tooltip(&mut self, target: TooltipTarget, text: &str) -> Lookup {
        self.tooltips.insert(target, text.to_string());
        Lookup::Found
    }

    fn set_slider_value(&mut self, value: u8) -> Lookup {
        self.slider_value = value.min(100);
        Lookup::Found
    }

    fn set_slider_expanded(&mut self, expanded: bool) -> Lookup {
        self.slider_expanded = expanded;
        Lookup::Found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    #[test]
    fn test_geometry_follows_last_layout() {
        let mut surface = TuiSurface::new(true);
        assert_eq!(surface.player_geometry(), None);

        surface.set_layout(ScreenLayout::compute(Rect::new(0, 0, 100, 40), true, false));
        let g = surface.player_geometry().unwrap();
        assert_eq!(g.player_height, 34.0);
        assert_eq!(g.video_top(), 10.0);

        let _ = surface.set_hud_offset(g.video_top());
        assert_eq!(surface.hud().offset, 10);
    }
}
