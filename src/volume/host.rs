//! Capabilities the volume controller needs from its host.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::VolumeOptions;

/// Outcome of touching a host element or API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Lookup {
    Found,
    Missing,
}

impl Lookup {
    pub fn is_missing(self) -> bool {
        self == Lookup::Missing
    }
}

/// Playback engine volume API.
pub trait PlaybackHost {
    /// Current volume, `None` while the playback API is not available.
    fn volume(&self) -> Option<u8>;

    fn set_volume(&mut self, volume: u8) -> Lookup;

    /// `Some(true)` when the current item is a music video rather than an audio
    /// track with artwork. `None` when the host cannot tell.
    fn video_mode(&self) -> Option<bool>;
}

/// A host that has not loaded yet behaves like one without a playback API.
impl<H: PlaybackHost> PlaybackHost for Option<H> {
    fn volume(&self) -> Option<u8> {
        self.as_ref().and_then(H::volume)
    }

    fn set_volume(&mut self, volume: u8) -> Lookup {
        match self {
            Some(h) => h.set_volume(volume),
            None => Lookup::Missing,
        }
    }

    fn video_mode(&self) -> Option<bool> {
        self.as_ref().and_then(H::video_mode)
    }
}

const MAX_IN_FLIGHT: usize = 16;

/// Volumes written to an asynchronous player that it has not reported back yet.
///
/// Players echo every write through their volume observer, possibly after
/// further writes went out. An echo must not roll the cached volume back.
#[derive(Debug, Default)]
pub struct InFlight(VecDeque<u8>);

impl InFlight {
    pub fn push(&mut self, volume: u8) {
        if self.0.len() == MAX_IN_FLIGHT {
            self.0.pop_front();
        }
        self.0.push_back(volume);
    }

    /// `true` when `reported` is the echo of one of our writes. Older writes the
    /// player skipped over go with it. Anything else is a change made elsewhere
    /// and forgets every pending write.
    pub fn acknowledge(&mut self, reported: u8) -> bool {
        match self.0.iter().position(|&v| v == reported) {
            Some(i) => {
                self.0.drain(..=i);
                true
            }
            None => {
                self.0.clear();
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipTarget {
    Slider,
    VolumeButton,
    ExpandSlider,
    ExpandButton,
}

impl TooltipTarget {
    pub const ALL: [TooltipTarget; 4] = [
        TooltipTarget::Slider,
        TooltipTarget::VolumeButton,
        TooltipTarget::ExpandSlider,
        TooltipTarget::ExpandButton,
    ];
}

/// Where the HUD lives: over the video panel, or in the nav bar when the
/// video panel is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HudPlacement {
    NavBar,
    Video,
}

/// Heights in the host's layout unit (pixels for the bridge, rows for the TUI).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerGeometry {
    pub player_height: f32,
    pub video_height: f32,
}

impl PlayerGeometry {
    /// Top offset that vertically centres the HUD band over the video.
    pub fn video_top(&self) -> f32 {
        ((self.player_height - self.video_height) / 2.0).max(0.0)
    }
}

/// Rendering surface for the HUD, tooltips and volume slider.
pub trait Surface {
    fn main_panel_visible(&self) -> bool;

    fn player_geometry(&self) -> Option<PlayerGeometry>;

    fn place_hud(&mut self, placement: HudPlacement) -> Lookup;

    fn show_hud(&mut self, text: &str) -> Lookup;

    fn hide_hud(&mut self) -> Lookup;

    fn set_hud_offset(&mut self, top: f32) -> Lookup;

    fn set_tooltip(&mut self, target: TooltipTarget, text: &str) -> Lookup;

    fn set_slider_value(&mut self, value: u8) -> Lookup;

    fn set_slider_expanded(&mut self, expanded: bool) -> Lookup;
}

/// Persisted plugin options.
pub trait OptionsStore {
    fn persist(&mut self, options: &VolumeOptions) -> anyhow::Result<()>;

    /// Tell other observers of the same options about a change.
    fn publish(&mut self, _options: &VolumeOptions) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u8);

    impl PlaybackHost for Fixed {
        fn volume(&self) -> Option<u8> {
            Some(self.0)
        }

        fn set_volume(&mut self, volume: u8) -> Lookup {
            self.0 = volume;
            Lookup::Found
        }

        fn video_mode(&self) -> Option<bool> {
            Some(false)
        }
    }

    #[test]
    fn test_absent_host_is_missing() {
        let mut host: Option<Fixed> = None;
        assert_eq!(host.volume(), None);
        assert!(host.set_volume(10).is_missing());

        let mut host = Some(Fixed(20));
        assert_eq!(host.set_volume(30), Lookup::Found);
        assert_eq!(host.volume(), Some(30));
    }

    #[test]
    fn test_in_flight_echoes() {
        let mut pending = InFlight::default();
        pending.push(55);
        pending.push(60);
        pending.push(65);

        assert!(pending.acknowledge(55));
        // 60 was coalesced away by the player.
        assert!(pending.acknowledge(65));
        assert!(!pending.acknowledge(60));

        pending.push(70);
        assert!(!pending.acknowledge(30));
        assert!(!pending.acknowledge(70));
    }

    #[test]
    fn test_video_top() {
        let g = PlayerGeometry {
            player_height: 400.0,
            video_height: 300.0,
        };
        assert_eq!(g.video_top(), 50.0);
        let g = PlayerGeometry {
            player_height: 100.0,
            video_height: 300.0,
        };
        assert_eq!(g.video_top(), 0.0);
    }
}
