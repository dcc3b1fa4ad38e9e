//! Line-delimited JSON messages exchanged with the shell.

use serde::{Deserialize, Serialize};

use crate::config::{VolumeOptions, VolumeOptionsPatch};
use crate::volume::{HudPlacement, TooltipTarget, WheelRegion};

/// Shell elements the surface may touch. Only those announced in
/// `api_loaded` are considered present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Hud,
    Slider,
    VolumeButton,
    ExpandSlider,
    ExpandButton,
}

impl From<TooltipTarget> for Element {
    fn from(target: TooltipTarget) -> Self {
        match target {
            TooltipTarget::Slider => Element::Slider,
            TooltipTarget::VolumeButton => Element::VolumeButton,
            TooltipTarget::ExpandSlider => Element::ExpandSlider,
            TooltipTarget::ExpandButton => Element::ExpandButton,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// Playback API ready. `volume` is absent when the shell has no volume API.
    ApiLoaded {
        #[serde(default)]
        volume: Option<u8>,
        #[serde(default)]
        main_panel_visible: bool,
        #[serde(default)]
        elements: Vec<Element>,
        #[serde(default)]
        player_height: Option<f32>,
        #[serde(default)]
        video_height: Option<f32>,
        #[serde(default)]
        video_mode: Option<bool>,
    },
    SearchLyrics {
        #[serde(default)]
        request_id: Option<u64>,
        artist: String,
        title: String,
    },
    ChangeVolume {
        increase: bool,
    },
    SetOptions {
        options: VolumeOptionsPatch,
    },
    Wheel {
        region: WheelRegion,
        delta_y: f64,
    },
    /// DOM `KeyboardEvent.code`.
    Key {
        code: String,
    },
    SliderChanged {
        old: u8,
        value: u8,
    },
    Pointer {
        over_bar: bool,
    },
    SourceChanged {
        #[serde(default)]
        video_mode: Option<bool>,
        #[serde(default)]
        player_height: Option<f32>,
        #[serde(default)]
        video_height: Option<f32>,
    },
    /// Volume / source state pushed by the shell, e.g. after a change made elsewhere.
    Playback {
        #[serde(default)]
        volume: Option<u8>,
        #[serde(default)]
        video_mode: Option<bool>,
        #[serde(default)]
        player_height: Option<f32>,
        #[serde(default)]
        video_height: Option<f32>,
    },
    /// Heights are the layout at the time of the move, after a resize.
    MoveHud {
        show_video: bool,
        #[serde(default)]
        player_height: Option<f32>,
        #[serde(default)]
        video_height: Option<f32>,
    },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Lyrics {
        request_id: Option<u64>,
        lyrics: Option<String>,
    },
    SetVolume {
        volume: u8,
    },
    Hud {
        text: String,
        visible: bool,
    },
    HudPlacement {
        placement: HudPlacement,
    },
    HudOffset {
        top: f32,
    },
    Tooltip {
        target: TooltipTarget,
        text: String,
    },
    Slider {
        value: u8,
    },
    SliderExpanded {
        expanded: bool,
    },
    Options {
        options: VolumeOptions,
    },
    Error {
        message: String,
    },
}

pub fn parse_inbound(line: &str) -> anyhow::Result<Inbound> {
    Ok(serde_json::from_str(line)?)
}
