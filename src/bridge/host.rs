//! Controller capabilities backed by bridge messages.

use std::collections::HashSet;
use tokio::sync::mpsc;

use super::protocol::{Element, Outbound};
use crate::volume::{
    HudPlacement, InFlight, Lookup, PlaybackHost, PlayerGeometry, Surface, TooltipTarget,
};

pub type Outbox = mpsc::UnboundedSender<Outbound>;

fn emit(out: &Outbox, msg: Outbound) {
    if out.send(msg).is_err() {
        tracing::debug!("bridge writer gone, dropping message");
    }
}

/// Playback state as last reported by the shell.
#[derive(Debug)]
pub struct BridgeHost {
    out: Outbox,
    volume: Option<u8>,
    in_flight: InFlight,
    video_mode: Option<bool>,
}

impl BridgeHost {
    pub fn new(out: Outbox, volume: Option<u8>, video_mode: Option<bool>) -> Self {
        Self {
            out,
            volume: volume.map(|v| v.min(100)),
            in_flight: InFlight::default(),
            video_mode,
        }
    }

    pub fn update(&mut self, volume: Option<u8>, video_mode: Option<bool>) {
        if let Some(v) = volume.map(|v| v.min(100))
            && !(self.volume.is_some() && self.in_flight.acknowledge(v))
        {
            self.volume = Some(v);
        }
        if video_mode.is_some() {
            self.video_mode = video_mode;
        }
    }
}

impl PlaybackHost for BridgeHost {
    fn volume(&self) -> Option<u8> {
        self.volume
    }

    fn set_volume(&mut self, volume: u8) -> Lookup {
        if self.volume.is_none() {
            return Lookup::Missing;
        }
        if self.volume != Some(volume) {
            self.in_flight.push(volume);
        }
        self.volume = Some(volume);
        emit(&self.out, Outbound::SetVolume { volume });
        Lookup::Found
    }

    fn video_mode(&self) -> Option<bool> {
        self.video_mode
    }
}

#[derive(Debug)]
pub struct BridgeSurface {
    out: Outbox,
    elements: HashSet<Element>,
    main_panel_visible: bool,
    geometry: Option<PlayerGeometry>,
    hud_text: String,
}

impl BridgeSurface {
    pub fn new(
        out: Outbox,
        elements: impl IntoIterator<Item = Element>,
        main_panel_visible: bool,
        geometry: Option<PlayerGeometry>,
    ) -> Self {
        Self {
            out,
            elements: elements.into_iter().collect(),
            main_panel_visible,
            geometry,
            hud_text: String::new(),
        }
    }

    /// Take new heights from the shell. A lone height only adjusts a known layout.
    pub fn resize(&mut self, player_height: Option<f32>, video_height: Option<f32>) {
        if let (Some(player_height), Some(video_height)) = (player_height, video_height) {
            self.geometry = Some(PlayerGeometry {
                player_height,
                video_height,
            });
        } else if let Some(g) = self.geometry.as_mut() {
            if let Some(h) = player_height {
                g.player_height = h;
            }
            if let Some(h) = video_height {
                g.video_height = h;
            }
        }
    }

    fn send_if(&self, element: Element, msg: Outbound) -> Lookup {
        if !self.elements.contains(&element) {
            return Lookup::Missing;
        }
        emit(&self.out, msg);
        Lookup::Found
    }
}

impl Surface for BridgeSurface {
    fn main_panel_visible(&self) -> bool {
        self.main_panel_visible
    }

    fn player_geometry(&self) -> Option<PlayerGeometry> {
        self.geometry
    }

    fn place_hud(&mut self, placement: HudPlacement) -> Lookup {
        self.send_if(Element::Hud, Outbound::HudPlacement { placement })
    }

    fn show_hud(&mut self, text: &str) -> Lookup {
        self.hud_text = text.to_string();
        self.send_if(
            Element::Hud,
            Outbound::Hud {
                text: text.to_string(),
                visible: true,
            },
        )
    }

    fn hide_hud(&mut self) -> Lookup {
        self.send_if(
            Element::Hud,
            Outbound::Hud {
                text: self.hud_text.clone(),
                visible: false,
            },
        )
    }

    fn set_hud_offset(&mut self, top: f32) -> Lookup {
        self.send_if(Element::Hud, Outbound::HudOffset { top })
    }

    fn set_tooltip(&mut self, target: TooltipTarget, text: &str) -> Lookup {
        self.send_if(
            target.into(),
            Outbound::Tooltip {
                target,
                text: text.to_string(),
            },
        )
    }

    fn set_slider_value(&mut self, value: u8) -> Lookup {
        self.send_if(Element::Slider, Outbound::Slider { value })
    }

    fn set_slider_expanded(&mut self, expanded: bool) -> Lookup {
        self.send_if(Element::ExpandSlider, Outbound::SliderExpanded { expanded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_elements_are_missing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut surface = BridgeSurface::new(tx, [Element::Slider], true, None);

        assert!(surface.show_hud("20%").is_missing());
        assert!(surface.set_tooltip(TooltipTarget::VolumeButton, "20%").is_missing());
        assert_eq!(surface.set_slider_value(20), Lookup::Found);
        assert_eq!(rx.try_recv().unwrap(), Outbound::Slider { value: 20 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_hide_keeps_last_text() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut surface = BridgeSurface::new(tx, [Element::Hud], false, None);
        let _ = surface.show_hud("70%");
        let _ = surface.hide_hud();
        let _ = rx.try_recv();
        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::Hud {
                text: "70%".into(),
                visible: false
            }
        );
    }

    #[test]
    fn test_late_playback_report_keeps_written_volume() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut host = BridgeHost::new(tx, Some(50), None);
        let _ = host.set_volume(51);
        let _ = host.set_volume(52);
        host.update(Some(51), None);
        assert_eq!(host.volume(), Some(52));
        host.update(Some(52), None);
        assert_eq!(host.volume(), Some(52));
        host.update(Some(80), None);
        assert_eq!(host.volume(), Some(80));
    }

    #[test]
    fn test_resize_updates_geometry() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut surface = BridgeSurface::new(tx, [Element::Hud], true, None);
        surface.resize(Some(500.0), None);
        assert_eq!(surface.player_geometry(), None);
        surface.resize(Some(500.0), Some(300.0));
        surface.resize(None, Some(400.0));
        assert_eq!(
            surface.player_geometry(),
            Some(PlayerGeometry {
                player_height: 500.0,
                video_height: 400.0
            })
        );
    }

    #[test]
    fn test_host_clamps_reported_volume() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut host = BridgeHost::new(tx, None, None);
        assert!(host.set_volume(10).is_missing());
        host.update(Some(150), Some(true));
        assert_eq!(host.volume(), Some(100));
        assert_eq!(host.video_mode(), Some(true));
        assert_eq!(host.set_volume(10), Lookup::Found);
        assert_eq!(rx.try_recv().unwrap(), Outbound::SetVolume { volume: 10 });
    }
}
