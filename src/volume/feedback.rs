//! Transient volume feedback: HUD, expanded slider, tooltips.
//!
//! The HUD and the slider decay independently. The slider does not collapse
//! while the pointer is over the control bar; it collapses when the pointer
//! leaves instead.

use tokio::time::Instant;

use super::host::{Surface, TooltipTarget};
use crate::config::VolumeTuning;
use crate::debounce::{self, Debounced};

#[derive(Debug)]
pub struct Feedback {
    hud_fade: Debounced<()>,
    slider_decay: Debounced<()>,
    hud_move: Debounced<bool>,
    hud_visible: bool,
    slider_expanded: bool,
    bar_hovered: bool,
}

impl Feedback {
    pub fn new(tuning: &VolumeTuning) -> Self {
        Self {
            hud_fade: Debounced::from_millis(tuning.hud_fade_ms),
            slider_decay: Debounced::from_millis(tuning.slider_decay_ms),
            hud_move: Debounced::from_millis(tuning.hud_move_ms),
            hud_visible: false,
            slider_expanded: false,
            bar_hovered: false,
        }
    }

    pub fn show_hud(&mut self, surface: &mut impl Surface, volume: u8, now: Instant) {
        if surface.show_hud(&format!("{volume}%")).is_missing() {
            tracing::trace!("volume HUD not present");
            return;
        }
        self.hud_visible = true;
        self.hud_fade.schedule(now, ());
    }

    pub fn expand_slider(&mut self, surface: &mut impl Surface, now: Instant) {
        if surface.set_slider_expanded(true).is_missing() {
            tracing::trace!("volume slider not present");
            return;
        }
        self.slider_expanded = true;
        self.slider_decay.schedule(now, ());
    }

    pub fn set_tooltips(&self, surface: &mut impl Surface, volume: u8) {
        let text = format!("{volume}%");
        for target in TooltipTarget::ALL {
            if surface.set_tooltip(target, &text).is_missing() {
                tracing::trace!(?target, "tooltip target not present");
            }
        }
    }

    pub fn request_hud_move(&mut self, show_video: bool, now: Instant) {
        self.hud_move.schedule(now, show_video);
    }

    pub fn pointer_over_bar(&mut self, surface: &mut impl Surface, hovered: bool) {
        self.bar_hovered = hovered;
        // Decay elapsed while hovered: collapse now.
        if !hovered && self.slider_expanded && !self.slider_decay.is_pending() {
            self.collapse_slider(surface);
        }
    }

    pub fn poll(&mut self, surface: &mut impl Surface, now: Instant) {
        if self.hud_fade.poll(now).is_some() {
            let _ = surface.hide_hud();
            self.hud_visible = false;
        }
        if self.slider_decay.poll(now).is_some() && !self.bar_hovered {
            self.collapse_slider(surface);
        }
        if let Some(show_video) = self.hud_move.poll(now) {
            let top = if show_video {
                surface
                    .player_geometry()
                    .map(|g| g.video_top())
                    .unwrap_or(0.0)
            } else {
                0.0
            };
            if surface.set_hud_offset(top).is_missing() {
                tracing::trace!("volume HUD not present, not moving it");
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        debounce::earliest([
            self.hud_fade.deadline(),
            self.slider_decay.deadline(),
            self.hud_move.deadline(),
        ])
    }

    pub fn hud_visible(&self) -> bool {
        self.hud_visible
    }

    pub fn slider_expanded(&self) -> bool {
        self.slider_expanded
    }

    fn collapse_slider(&mut self, surface: &mut impl Surface) {
        let _ = surface.set_slider_expanded(false);
        self.slider_expanded = false;
    }
}
