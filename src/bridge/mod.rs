//! `serve` mode: the plugins behind a JSON-lines bridge on stdin/stdout.
//!
//! The shell owns the real player and DOM. It forwards input and playback state
//! as [`Inbound`] messages and renders the [`Outbound`] commands we send back.

pub mod host;
pub mod protocol;

use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::{Config, ConfigStore, VolumeOptions, VolumeOptionsPatch};
use crate::debounce;
use crate::lyrics::{LyricsResolver, TrackMetadata};
use crate::volume::{Arrow, Input, OptionsStore, VolumeController};
use host::{BridgeHost, BridgeSurface, Outbox};
pub use protocol::{Inbound, Outbound};

type Controller = VolumeController<BridgeHost, BridgeSurface, ConfigStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Bridge {
    cfg: Config,
    cfg_path: Option<PathBuf>,
    out: Outbox,
    options_tx: mpsc::UnboundedSender<VolumeOptions>,
    resolver: LyricsResolver,
    controller: Option<Controller>,
}

impl Bridge {
    pub fn new(
        cfg: Config,
        cfg_path: Option<PathBuf>,
        resolver: LyricsResolver,
        out: Outbox,
        options_tx: mpsc::UnboundedSender<VolumeOptions>,
    ) -> Self {
        Self {
            cfg,
            cfg_path,
            out,
            options_tx,
            resolver,
            controller: None,
        }
    }

    pub fn handle_line(&mut self, line: &str, now: Instant) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }
        match protocol::parse_inbound(line) {
            Ok(msg) => self.handle(msg, now),
            Err(e) => {
                tracing::debug!(error = %e, %line, "malformed bridge message");
                self.send(Outbound::Error {
                    message: format!("malformed message: {e}"),
                });
                Flow::Continue
            }
        }
    }

    pub fn handle(&mut self, msg: Inbound, now: Instant) -> Flow {
        match msg {
            Inbound::ApiLoaded {
                volume,
                main_panel_visible,
                elements,
                player_height,
                video_height,
                video_mode,
            } => {
                let mut surface =
                    BridgeSurface::new(self.out.clone(), elements, main_panel_visible, None);
                surface.resize(player_height, video_height);
                self.load_controller(BridgeHost::new(self.out.clone(), volume, video_mode), surface);
            }
            Inbound::SearchLyrics {
                request_id,
                artist,
                title,
            } => self.spawn_lyrics(request_id, TrackMetadata::new(artist, title)),
            Inbound::SetOptions { options } => self.set_options(options),
            Inbound::Shutdown => {
                self.shutdown();
                return Flow::Quit;
            }
            other => {
                let Some(c) = self.controller.as_mut() else {
                    tracing::debug!(msg = ?other, "playback API not loaded yet, ignoring");
                    return Flow::Continue;
                };
                dispatch(c, other, now);
            }
        }
        Flow::Continue
    }

    pub fn poll(&mut self, now: Instant) {
        if let Some(c) = self.controller.as_mut() {
            c.poll(now);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.as_ref().and_then(|c| c.next_deadline())
    }

    pub fn shutdown(&mut self) {
        if let Some(c) = self.controller.as_mut() {
            c.shutdown();
        }
    }

    fn load_controller(&mut self, host: BridgeHost, surface: BridgeSurface) {
        // A reload (shell navigated) keeps the options the old controller ended with.
        if let Some(mut old) = self.controller.take() {
            old.shutdown();
            self.cfg.volume = old.options().clone();
        }
        let mut c = VolumeController::new(
            self.cfg.volume.clone(),
            self.cfg.volume_tuning.clone(),
            host,
            surface,
            self.store(),
        );
        c.first_run();
        tracing::info!("playback API loaded");
        self.controller = Some(c);
    }

    fn set_options(&mut self, patch: VolumeOptionsPatch) {
        match self.controller.as_mut() {
            Some(c) => c.set_options(patch),
            None => {
                self.cfg.volume.merge(patch);
                let mut store = self.store();
                if let Err(e) = store.persist(&self.cfg.volume) {
                    tracing::warn!(error = %format!("{e:#}"), "failed to persist volume options");
                }
                store.publish(&self.cfg.volume);
            }
        }
    }

    fn store(&self) -> ConfigStore {
        ConfigStore::new(self.cfg.clone(), self.cfg_path.clone())
            .with_publisher(self.options_tx.clone())
    }

    fn spawn_lyrics(&self, request_id: Option<u64>, meta: TrackMetadata) {
        let resolver = self.resolver.clone();
        let out = self.out.clone();
        tokio::spawn(async move {
            let lyrics = resolver.resolve(&meta).await;
            tracing::debug!(?request_id, found = lyrics.is_some(), "lyrics lookup done");
            let _ = out.send(Outbound::Lyrics { request_id, lyrics });
        });
    }

    fn send(&self, msg: Outbound) {
        let _ = self.out.send(msg);
    }
}

fn dispatch(c: &mut Controller, msg: Inbound, now: Instant) {
    match msg {
        Inbound::ChangeVolume { increase } => c.change_volume(increase, now),
        Inbound::Wheel { region, delta_y } => c.handle(Input::Wheel { region, delta_y }, now),
        Inbound::Key { code } => match code.as_str() {
            "ArrowUp" => c.handle(Input::Arrow(Arrow::Up), now),
            "ArrowDown" => c.handle(Input::Arrow(Arrow::Down), now),
            _ => {}
        },
        Inbound::SliderChanged { old, value } => c.handle(Input::SliderMoved { old, value }, now),
        Inbound::Pointer { over_bar } => c.handle(Input::PointerOverBar(over_bar), now),
        Inbound::SourceChanged {
            video_mode,
            player_height,
            video_height,
        } => {
            c.surface_mut().resize(player_height, video_height);
            c.host_mut().update(None, video_mode);
            c.handle(Input::SourceChanged, now);
        }
        Inbound::Playback {
            volume,
            video_mode,
            player_height,
            video_height,
        } => {
            c.surface_mut().resize(player_height, video_height);
            c.host_mut().update(volume, video_mode);
        }
        Inbound::MoveHud {
            show_video,
            player_height,
            video_height,
        } => {
            c.surface_mut().resize(player_height, video_height);
            c.move_hud(show_video, now);
        }
        Inbound::ApiLoaded { .. }
        | Inbound::SearchLyrics { .. }
        | Inbound::SetOptions { .. }
        | Inbound::Shutdown => {}
    }
}

/// Run the bridge until stdin closes or the shell sends `shutdown`.
pub async fn serve(cfg: Config, cfg_path: Option<PathBuf>) -> anyhow::Result<()> {
    let resolver = LyricsResolver::from_config(&cfg.lyrics)?;
    tracing::info!(sources = ?resolver.source_names(), "bridge ready");

    let (out_tx, out_rx) = mpsc::unbounded_channel::<Outbound>();
    let (options_tx, mut options_rx) = mpsc::unbounded_channel::<VolumeOptions>();
    let (line_tx, mut line_rx) = mpsc::channel::<String>(256);

    let writer = tokio::spawn(write_outbound_loop(tokio::io::stdout(), out_rx));
    tokio::spawn(read_lines_loop(tokio::io::stdin(), line_tx));

    let mut bridge = Bridge::new(cfg, cfg_path, resolver, out_tx.clone(), options_tx);

    loop {
        let deadline = bridge.next_deadline();
        tokio::select! {
            line = line_rx.recv() => {
                let Some(line) = line else {
                    tracing::info!("stdin closed");
                    bridge.shutdown();
                    break;
                };
                if bridge.handle_line(&line, Instant::now()) == Flow::Quit {
                    break;
                }
            }
            Some(options) = options_rx.recv() => {
                let _ = out_tx.send(Outbound::Options { options });
            }
            _ = debounce::sleep_until(deadline) => {
                bridge.poll(Instant::now());
            }
        }
    }

    // Forward what the final flush published, then let the writer drain.
    while let Ok(options) = options_rx.try_recv() {
        let _ = out_tx.send(Outbound::Options { options });
    }
    drop(bridge);
    drop(out_tx);
    let _ = writer.await;
    Ok(())
}

async fn read_lines_loop<R>(reader: R, tx: mpsc::Sender<String>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "read bridge input");
                break;
            }
        }
    }
}

async fn write_outbound_loop<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Outbound>)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(msg) = rx.recv().await {
        let mut line = match serde_json::to_vec(&msg) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "encode bridge message");
                continue;
            }
        };
        line.push(b'\n');
        if let Err(e) = writer.write_all(&line).await {
            tracing::warn!(error = %e, "write bridge output");
            break;
        }
        if let Err(e) = writer.flush().await {
            tracing::warn!(error = %e, "flush bridge output");
            break;
        }
    }
}
