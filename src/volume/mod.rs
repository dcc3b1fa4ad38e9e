//! Precise volume control.
//!
//! Turns wheel, arrow-key and slider input into clamped volume changes, saves
//! the result with a debounce and drives the transient feedback layer. The
//! controller never owns a clock: callers pass `now` and drive [`VolumeController::poll`]
//! from their event loop using [`VolumeController::next_deadline`].

pub mod feedback;
pub mod host;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::{VolumeOptions, VolumeOptionsPatch, VolumeTuning};
use crate::debounce::{self, Debounced};
use feedback::Feedback;
pub use host::{
    HudPlacement, InFlight, Lookup, OptionsStore, PlaybackHost, PlayerGeometry, Surface,
    TooltipTarget,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// HUD visible.
    Adjusting,
    /// HUD gone, slider still expanded.
    SliderHover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelRegion {
    /// Video / artwork area.
    Player,
    /// Bottom control bar.
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Negative `delta_y` is wheel-up.
    Wheel { region: WheelRegion, delta_y: f64 },
    Arrow(Arrow),
    /// The host slider's value changed from `old` to `value`.
    SliderMoved { old: u8, value: u8 },
    PointerOverBar(bool),
    /// A new item started playing.
    SourceChanged,
}

/// Values in (0, 5) render as 5: the slider widget snaps to multiples of 5 and
/// would otherwise show an empty bar for a non-zero volume.
pub fn slider_display_value(volume: u8) -> u8 {
    if volume > 0 && volume < 5 { 5 } else { volume }
}

pub struct VolumeController<H, S, P> {
    options: VolumeOptions,
    tuning: VolumeTuning,
    host: H,
    surface: S,
    store: P,
    write: Debounced<VolumeOptions>,
    feedback: Feedback,
    video_panel: bool,
}

impl<H: PlaybackHost, S: Surface, P: OptionsStore> VolumeController<H, S, P> {
    pub fn new(options: VolumeOptions, tuning: VolumeTuning, host: H, surface: S, store: P) -> Self {
        Self {
            write: Debounced::from_millis(tuning.write_debounce_ms),
            feedback: Feedback::new(&tuning),
            options,
            tuning,
            host,
            surface,
            store,
            video_panel: false,
        }
    }

    /// Restore the saved volume and place the HUD. Call once the host is ready.
    pub fn first_run(&mut self) {
        if let Some(saved) = self.options.saved_volume {
            self.feedback.set_tooltips(&mut self.surface, saved);
            if let Some(current) = self.host.volume()
                && current != saved
            {
                tracing::info!(saved, current, "restoring saved volume");
                if self.host.set_volume(saved).is_missing() {
                    tracing::debug!(saved, "playback API unavailable, saved volume not restored");
                }
            }
        }

        self.video_panel = self.surface.main_panel_visible();
        let placement = if self.video_panel {
            HudPlacement::Video
        } else {
            HudPlacement::NavBar
        };
        if self.surface.place_hud(placement).is_missing() {
            tracing::debug!(?placement, "could not place volume HUD");
        }
    }

    pub fn handle(&mut self, input: Input, now: Instant) {
        match input {
            Input::Wheel { region, delta_y } => {
                if region == WheelRegion::Player && !self.video_panel {
                    return;
                }
                if delta_y < 0.0 {
                    self.change_volume(true, now);
                } else if delta_y > 0.0 {
                    self.change_volume(false, now);
                }
            }
            Input::Arrow(arrow) => {
                if self.options.arrows_shortcut {
                    self.change_volume(arrow == Arrow::Up, now);
                }
            }
            Input::SliderMoved { old, value } => self.slider_moved(old, value, now),
            Input::PointerOverBar(hovered) => {
                self.feedback.pointer_over_bar(&mut self.surface, hovered);
            }
            Input::SourceChanged => {
                if self.options.hud_follows_video
                    && self.video_panel
                    && let Some(show_video) = self.host.video_mode()
                {
                    self.move_hud(show_video, now);
                }
            }
        }
    }

    /// Step the volume up or down, clamped to [0, 100].
    pub fn change_volume(&mut self, increase: bool, now: Instant) {
        let Some(current) = self.host.volume() else {
            tracing::debug!("playback API unavailable, ignoring volume change");
            return;
        };
        let current = current.min(100);
        let step = self.options.step();
        let next = if increase {
            current.saturating_add(step).min(100)
        } else {
            current.saturating_sub(step)
        };
        if self.host.set_volume(next).is_missing() {
            return;
        }
        let applied = self.host.volume().unwrap_or(next).min(100);

        self.save_volume(applied, now);
        if self
            .surface
            .set_slider_value(slider_display_value(applied))
            .is_missing()
        {
            tracing::trace!("volume slider not present");
        }
        self.feedback.set_tooltips(&mut self.surface, applied);
        self.feedback.expand_slider(&mut self.surface, now);
        self.feedback.show_hud(&mut self.surface, applied, now);
    }

    /// Debounced HUD reposition for the song / video layouts.
    pub fn move_hud(&mut self, show_video: bool, now: Instant) {
        self.feedback.request_hud_move(show_video, now);
    }

    /// Merge options coming from another observer (menu, other process).
    pub fn set_options(&mut self, patch: VolumeOptionsPatch) {
        self.options.merge(patch);
        // The merged options already include the latest saved volume.
        self.write.cancel();
        let options = self.options.clone();
        self.write_options(&options);
    }

    /// Run every timer whose deadline has passed.
    pub fn poll(&mut self, now: Instant) {
        if let Some(options) = self.write.poll(now) {
            self.write_options(&options);
        }
        self.feedback.poll(&mut self.surface, now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        debounce::earliest([self.write.deadline(), self.feedback.next_deadline()])
    }

    /// Write out a pending save right away.
    pub fn shutdown(&mut self) {
        if let Some(options) = self.write.flush() {
            self.write_options(&options);
        }
    }

    pub fn phase(&self) -> Phase {
        if self.feedback.hud_visible() {
            Phase::Adjusting
        } else if self.feedback.slider_expanded() {
            Phase::SliderHover
        } else {
            Phase::Idle
        }
    }

    pub fn options(&self) -> &VolumeOptions {
        &self.options
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    fn slider_moved(&mut self, old: u8, value: u8, now: Instant) {
        if old == value {
            return;
        }
        let value = value.min(100);
        let manual = match self.options.saved_volume {
            None => true,
            Some(saved) => saved.abs_diff(value) > self.tuning.manual_change_tolerance,
        };
        if !manual {
            return;
        }
        tracing::debug!(value, "volume slider set manually");
        self.feedback.set_tooltips(&mut self.surface, value);
        self.save_volume(value, now);
    }

    fn save_volume(&mut self, volume: u8, now: Instant) {
        self.options.saved_volume = Some(volume);
        self.write.schedule(now, self.options.clone());
    }

    fn write_options(&mut self, options: &VolumeOptions) {
        if let Err(e) = self.store.persist(options) {
            tracing::warn!(error = %format!("{e:#}"), "failed to persist volume options");
        }
        self.store.publish(options);
    }
}
