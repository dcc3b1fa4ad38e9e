pub mod actions;
pub mod events;
pub mod state;

use crate::config::{Config, ConfigStore};
use crate::debounce;
use crate::input;
use crate::lyrics::{self, LyricsResolver, TrackMetadata};
use crate::player::mpv::{MpvHandle, MpvHost};
use crate::tui::{self, TuiSurface, TuiTerminal};
use crate::volume::{Input, PlaybackHost, Surface, VolumeController, slider_display_value};
use actions::Action;
use events::{Event, LyricsEvent, PlayerEvent};
use state::{AppState, Toast};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// No host until mpv is up; volume input is a no-op meanwhile.
type TuiController = VolumeController<Option<MpvHost>, TuiSurface, ConfigStore>;

pub struct App {
    cfg: Config,
    state: AppState,
    resolver: LyricsResolver,
    controller: TuiController,
    mpv: Option<MpvHandle>,
    api_loaded: bool,
}

impl App {
    pub fn new(cfg: Config, config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let resolver = LyricsResolver::from_config(&cfg.lyrics)?;
        let controller = VolumeController::new(
            cfg.volume.clone(),
            cfg.volume_tuning.clone(),
            None,
            TuiSurface::new(cfg.player.show_video_panel),
            ConfigStore::new(cfg.clone(), config_path),
        );

        Ok(Self {
            cfg,
            state: AppState::new(),
            resolver,
            controller,
            mpv: None,
            api_loaded: false,
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal, file: Option<&str>) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone(), self.cfg.input.mouse);

        // mpv is best-effort: the UI still runs (lyrics lookup) without it.
        let mpv_log = std::env::temp_dir().join("void-plugins-mpv.log");
        match MpvHandle::spawn(tx.clone(), self.cfg.player.audio_device.as_deref(), Some(&mpv_log)).await {
            Ok(h) => {
                *self.controller.host_mut() = Some(h.host());
                if let Some(url) = file
                    && let Err(e) = h.load_url(url)
                {
                    self.state.toast = Some(Toast::error(format!("load failed: {e:#}")));
                }
                self.mpv = Some(h);
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "mpv unavailable");
                self.state.toast = Some(Toast::error(format!("mpv disabled: {e:#}")));
            }
        }

        tui::draw(terminal, &mut self.state, self.controller.surface_mut())?;

        loop {
            let deadline = debounce::earliest([
                self.controller.next_deadline(),
                self.state.toast.as_ref().map(Toast::expires_at),
            ]);
            tokio::select! {
                ev = rx.recv() => {
                    let Some(ev) = ev else { break };
                    self.handle_event(ev, &tx);
                }
                _ = debounce::sleep_until(deadline) => {
                    self.controller.poll(Instant::now());
                }
            }

            if self.state.should_quit {
                break;
            }

            tui::draw(terminal, &mut self.state, self.controller.surface_mut())?;
        }

        self.controller.shutdown();
        Ok(())
    }

    fn handle_event(&mut self, ev: Event, tx: &mpsc::Sender<Event>) {
        match ev {
            Event::Input(input_ev) => {
                let layout = *self.controller.surface().layout();
                if let Some(action) = input::map_input_to_action(&self.state, &layout, input_ev) {
                    self.handle_action(action, tx);
                }
            }
            Event::Player(pe) => self.handle_player(pe, tx),
            Event::Lyrics(LyricsEvent::Loaded {
                request_id,
                meta,
                lyrics,
            }) => {
                let found = lyrics.is_some();
                if self.state.lyrics.finish(request_id, lyrics) {
                    tracing::debug!(artist = %meta.artist, title = %meta.title, found, "lyrics lookup done");
                    if !found {
                        self.state.status = "No lyrics found".into();
                    }
                }
            }
        }
    }

    fn handle_action(&mut self, action: Action, tx: &mpsc::Sender<Event>) {
        let now = Instant::now();
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::Volume(input) => {
                self.controller.handle(input, now);
                tracing::trace!(phase = ?self.controller.phase(), "volume input");
            }
            Action::SliderSet(value) => {
                // The slider drives mpv directly; the controller only sees the change.
                let old = self.controller.surface().slider_value();
                if self.controller.host_mut().set_volume(value).is_missing() {
                    return;
                }
                let _ = self.controller.surface_mut().set_slider_value(value);
                self.controller.handle(Input::SliderMoved { old, value }, now);
            }
            Action::PointerOverBar(over) => {
                self.state.pointer_over_bar = over;
                self.controller.handle(Input::PointerOverBar(over), now);
            }
            Action::TogglePause => {
                if let Some(mpv) = &self.mpv
                    && let Err(e) = mpv.toggle_pause()
                {
                    self.state.toast = Some(Toast::error(format!("mpv error: {e:#}")));
                }
            }
            Action::FetchLyrics => match self.state.track.clone() {
                Some(meta) => self.spawn_lyrics(meta, tx),
                None => self.state.toast = Some(Toast::error("Nothing playing")),
            },
            Action::ScrollLyrics(delta) => self.state.lyrics.scroll_by(delta),
            Action::ToggleHelp => self.state.show_help = !self.state.show_help,
            Action::Resize => {}
        }
    }

    fn handle_player(&mut self, pe: PlayerEvent, tx: &mpsc::Sender<Event>) {
        let now = Instant::now();
        let changed = self
            .controller
            .host_mut()
            .as_mut()
            .and_then(|host| host.apply(&pe));

        match pe {
            PlayerEvent::Volume(_) => {
                // Echoes of our own writes are already reflected everywhere.
                let Some(value) = changed else { return };
                if !self.api_loaded {
                    self.api_loaded = true;
                    self.controller.first_run();
                    // first_run may have restored the saved volume.
                    let current = self.controller.host().volume().unwrap_or(value);
                    let _ = self
                        .controller
                        .surface_mut()
                        .set_slider_value(slider_display_value(current));
                    self.state.toast = Some(Toast::success("Playback ready"));
                    return;
                }
                // Volume changed by another mpv client.
                let old = self.controller.surface().slider_value();
                let shown = slider_display_value(value);
                if old != shown {
                    let _ = self.controller.surface_mut().set_slider_value(shown);
                    self.controller.handle(Input::SliderMoved { old, value }, now);
                }
            }
            PlayerEvent::VideoMode(_) => self.controller.handle(Input::SourceChanged, now),
            PlayerEvent::FileLoaded => {
                self.state.track = None;
                self.state.media_title = None;
                self.state.lyrics.clear();
            }
            PlayerEvent::Metadata { artist, title } => {
                let (Some(artist), Some(title)) = (artist, title) else {
                    return;
                };
                let meta = TrackMetadata::new(artist, title);
                if self.state.track.as_ref() != Some(&meta) {
                    self.state.track = Some(meta.clone());
                    self.spawn_lyrics(meta, tx);
                }
            }
            PlayerEvent::MediaTitle(title) => {
                if self.state.track.is_none()
                    && let Some(meta) = lyrics::names::split_media_title(&title)
                {
                    self.state.track = Some(meta.clone());
                    self.spawn_lyrics(meta, tx);
                }
                self.state.media_title = Some(title);
            }
            PlayerEvent::Paused(p) => self.state.paused = p,
            PlayerEvent::Error(msg) => {
                tracing::warn!(%msg, "player error");
                self.state.toast = Some(Toast::error(msg));
            }
        }
    }

    fn spawn_lyrics(&mut self, meta: TrackMetadata, tx: &mpsc::Sender<Event>) {
        let request_id = self.state.lyrics.begin();
        self.state.status.clear();
        let resolver = self.resolver.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let lyrics = resolver.resolve(&meta).await;
            let _ = tx
                .send(Event::Lyrics(LyricsEvent::Loaded {
                    request_id,
                    meta,
                    lyrics,
                }))
                .await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::WheelRegion;
    use serde_json::{Value, json};

    struct Harness {
        app: App,
        cmd_rx: mpsc::UnboundedReceiver<Value>,
        tx: mpsc::Sender<Event>,
        _rx: mpsc::Receiver<Event>,
        dir: PathBuf,
    }

    impl Harness {
        fn new(name: &str, cfg: Config) -> Self {
            let dir = std::env::temp_dir()
                .join(format!("void-plugins-app-{name}-{}", std::process::id()));
            let mut app = App::new(cfg, Some(dir.join("config.toml"))).unwrap();
            let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
            *app.controller.host_mut() = Some(MpvHost::new(cmd_tx));
            let (tx, rx) = mpsc::channel(16);
            Self {
                app,
                cmd_rx,
                tx,
                _rx: rx,
                dir,
            }
        }

        fn player(&mut self, pe: PlayerEvent) {
            self.app.handle_player(pe, &self.tx);
        }

        fn action(&mut self, action: Action) {
            self.app.handle_action(action, &self.tx);
        }

        fn wheel_up(&mut self) {
            self.action(Action::Volume(Input::Wheel {
                region: WheelRegion::Bar,
                delta_y: -1.0,
            }));
        }

        fn sent_volumes(&mut self) -> Vec<u64> {
            let mut out = Vec::new();
            while let Ok(cmd) = self.cmd_rx.try_recv() {
                if let Some(v) = cmd["command"][2].as_u64() {
                    out.push(v);
                }
            }
            out
        }

        fn saved_volume(&self) -> Option<u8> {
            self.app.controller.options().saved_volume
        }

        fn slider(&self) -> u8 {
            self.app.controller.surface().slider_value()
        }
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    fn cfg_with_steps(steps: u8) -> Config {
        let mut cfg = Config::default();
        cfg.volume.steps = steps;
        cfg
    }

    #[tokio::test]
    async fn test_late_echoes_keep_rapid_wheel_steps() {
        let mut h = Harness::new("echo", cfg_with_steps(5));
        h.player(PlayerEvent::Volume(50.0));
        for _ in 0..3 {
            h.wheel_up();
        }
        h.player(PlayerEvent::Volume(55.0));
        h.wheel_up();
        for v in [60.0, 65.0, 70.0] {
            h.player(PlayerEvent::Volume(v));
        }

        assert_eq!(h.sent_volumes(), vec![55, 60, 65, 70]);
        assert_eq!(h.app.controller.host().volume(), Some(70));
        assert_eq!(h.slider(), 70);
        assert_eq!(h.saved_volume(), Some(70));

        h.app.controller.shutdown();
        let saved = crate::config::load(Some(&h.dir.join("config.toml"))).unwrap();
        assert_eq!(saved.volume.saved_volume, Some(70));
    }

    #[tokio::test]
    async fn test_first_report_restores_saved_volume() {
        let mut cfg = Config::default();
        cfg.volume.saved_volume = Some(30);
        let mut h = Harness::new("restore", cfg);

        h.player(PlayerEvent::Volume(50.0));
        assert!(h.app.api_loaded);
        assert_eq!(h.sent_volumes(), vec![30]);
        assert_eq!(h.slider(), 30);
        assert!(matches!(&h.app.state.toast, Some(t) if t.message == "Playback ready"));

        h.player(PlayerEvent::Volume(30.0));
        assert_eq!(h.slider(), 30);
        assert_eq!(h.saved_volume(), Some(30));
        assert_eq!(h.app.controller.next_deadline(), None);
    }

    #[tokio::test]
    async fn test_external_change_counts_as_slider_move() {
        let mut h = Harness::new("external", Config::default());
        h.player(PlayerEvent::Volume(50.0));
        assert_eq!(h.saved_volume(), None);

        h.player(PlayerEvent::Volume(30.0));
        assert_eq!(h.slider(), 30);
        assert_eq!(h.saved_volume(), Some(30));

        // Within the manual-change tolerance of the saved value.
        h.player(PlayerEvent::Volume(32.0));
        assert_eq!(h.slider(), 32);
        assert_eq!(h.saved_volume(), Some(30));
        assert!(h.sent_volumes().is_empty());
    }

    #[tokio::test]
    async fn test_slider_set_drives_mpv() {
        let mut h = Harness::new("slider", Config::default());
        h.action(Action::SliderSet(80));
        assert!(h.sent_volumes().is_empty());

        h.player(PlayerEvent::Volume(50.0));
        h.action(Action::SliderSet(80));
        assert_eq!(
            h.cmd_rx.try_recv().unwrap(),
            json!({"command": ["set_property", "volume", 80]})
        );
        assert_eq!(h.slider(), 80);
        assert_eq!(h.saved_volume(), Some(80));

        h.player(PlayerEvent::Volume(80.0));
        assert_eq!(h.app.controller.host().volume(), Some(80));
        assert_eq!(h.slider(), 80);
    }

    #[tokio::test]
    async fn test_track_change_starts_lyrics_lookup() {
        let mut h = Harness::new("lyrics", Config::default());
        h.player(PlayerEvent::MediaTitle("Daft Punk - One More Time".into()));
        assert_eq!(
            h.app.state.track,
            Some(TrackMetadata::new("Daft Punk", "One More Time"))
        );
        assert!(h.app.state.lyrics.loading);
        let first = h.app.state.lyrics.request_id;

        // Tags win over the guessed split.
        h.player(PlayerEvent::Metadata {
            artist: Some("Daft Punk".into()),
            title: Some("Aerodynamic".into()),
        });
        assert!(h.app.state.lyrics.request_id > first);

        h.player(PlayerEvent::FileLoaded);
        assert_eq!(h.app.state.track, None);
        assert!(!h.app.state.lyrics.loading);

        // A reply for the old track is dropped.
        h.app.handle_event(
            Event::Lyrics(LyricsEvent::Loaded {
                request_id: first,
                meta: TrackMetadata::new("Daft Punk", "One More Time"),
                lyrics: Some("One more time".into()),
            }),
            &h.tx.clone(),
        );
        assert_eq!(h.app.state.lyrics.text, None);
    }
}
