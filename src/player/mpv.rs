use crate::app::events::{Event, PlayerEvent};
use crate::volume::{InFlight, Lookup, PlaybackHost};
use anyhow::Context;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, WriteHalf},
    net::UnixStream,
    process::{Child, Command},
    sync::mpsc,
};

const OBSERVED: [&str; 5] = [
    "volume",
    "current-tracks/video",
    "metadata",
    "media-title",
    "pause",
];

#[derive(Debug)]
pub struct MpvHandle {
    child: Child,
    socket_path: PathBuf,
    cmd_tx: mpsc::UnboundedSender<Value>,
}

impl MpvHandle {
    pub async fn spawn(
        event_tx: mpsc::Sender<Event>,
        audio_device: Option<&str>,
        log_file: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let socket_path =
            std::env::temp_dir().join(format!("void-plugins-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new("mpv");
        cmd.args([
            "--idle=yes",
            "--input-terminal=no",
            "--really-quiet",
            // Keep video tracks selected so we can tell songs from music videos.
            "--vo=null",
        ]);
        if let Some(dev) = audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        if let Some(p) = log_file {
            cmd.arg(format!("--log-file={}", p.display()));
        }
        let child = cmd
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .context("spawn mpv")?;

        // mpv creates the socket shortly after starting.
        let stream = connect_with_retry(&socket_path).await?;
        let (reader, writer) = tokio::io::split(stream);

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(write_commands_loop(writer, cmd_rx));
        tokio::spawn(read_events_loop(reader, event_tx));

        let this = Self {
            child,
            socket_path,
            cmd_tx,
        };

        this.command(json!({"command":["request_log_messages", "warn"]}))?;
        for (id, name) in OBSERVED.iter().enumerate() {
            this.command(json!({"command":["observe_property", id + 1, name]}))?;
        }

        Ok(this)
    }

    pub fn load_url(&self, url: &str) -> anyhow::Result<()> {
        self.command(json!({"command":["loadfile", url, "replace"]}))
    }

    pub fn toggle_pause(&self) -> anyhow::Result<()> {
        self.command(json!({"command":["cycle", "pause"]}))
    }

    /// Volume handle for the controller. State is filled in by [`MpvHost::apply`].
    pub fn host(&self) -> MpvHost {
        MpvHost::new(self.cmd_tx.clone())
    }

    fn command(&self, v: Value) -> anyhow::Result<()> {
        self.cmd_tx
            .send(v)
            .map_err(|_| anyhow::anyhow!("mpv ipc writer stopped"))
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Cached mpv playback state behind the synchronous [`PlaybackHost`] API.
#[derive(Debug)]
pub struct MpvHost {
    cmd_tx: mpsc::UnboundedSender<Value>,
    volume: Option<u8>,
    in_flight: InFlight,
    video_mode: Option<bool>,
}

impl MpvHost {
    pub fn new(cmd_tx: mpsc::UnboundedSender<Value>) -> Self {
        Self {
            cmd_tx,
            volume: None,
            in_flight: InFlight::default(),
            video_mode: None,
        }
    }

    /// Fold an observer event into the cache. Returns the new volume when a
    /// volume report is not the echo of our own `set_property`.
    pub fn apply(&mut self, ev: &PlayerEvent) -> Option<u8> {
        match ev {
            PlayerEvent::Volume(v) => {
                let reported = v.round().clamp(0.0, 100.0) as u8;
                if self.volume.is_some() && self.in_flight.acknowledge(reported) {
                    return None;
                }
                self.volume = Some(reported);
                Some(reported)
            }
            PlayerEvent::VideoMode(on) => {
                self.video_mode = Some(*on);
                None
            }
            _ => None,
        }
    }
}

impl PlaybackHost for MpvHost {
    fn volume(&self) -> Option<u8> {
        self.volume
    }

    fn set_volume(&mut self, volume: u8) -> Lookup {
        if self.volume.is_none() {
            return Lookup::Missing;
        }
        let cmd = json!({"command":["set_property", "volume", volume]});
        if self.cmd_tx.send(cmd).is_err() {
            tracing::warn!("mpv ipc writer stopped, volume not applied");
            return Lookup::Missing;
        }
        // mpv only echoes actual changes through the volume observer.
        if self.volume != Some(volume) {
            self.in_flight.push(volume);
        }
        self.volume = Some(volume);
        Lookup::Found
    }

    fn video_mode(&self) -> Option<bool> {
        self.video_mode
    }
}

async fn connect_with_retry(path: &PathBuf) -> anyhow::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        match UnixStream::connect(path).await {
            Ok(s) => return Ok(s),
            Err(e) => {
                if tokio::time::Instant::now() > deadline {
                    return Err(e).with_context(|| format!("connect to mpv ipc {}", path.display()));
                }
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        }
    }
}

async fn write_commands_loop(
    mut writer: WriteHalf<UnixStream>,
    mut rx: mpsc::UnboundedReceiver<Value>,
) {
    let mut request_id: u64 = 1;
    while let Some(mut v) = rx.recv().await {
        // Tag requests so errors come back as structured replies.
        if let Value::Object(ref mut o) = v
            && !o.contains_key("request_id")
        {
            o.insert("request_id".to_string(), Value::from(request_id));
            request_id += 1;
        }
        let mut line = match serde_json::to_vec(&v) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "encode mpv json");
                continue;
            }
        };
        line.push(b'\n');
        if let Err(e) = writer.write_all(&line).await {
            tracing::warn!(error = %e, "write mpv ipc");
            break;
        }
        if let Err(e) = writer.flush().await {
            tracing::warn!(error = %e, "flush mpv ipc");
            break;
        }
    }
}

async fn read_events_loop(reader: tokio::io::ReadHalf<UnixStream>, event_tx: mpsc::Sender<Event>) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(v) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        // Command replies: {"request_id":..., "error":"..."}
        if let (Some(_rid), Some(err)) = (v.get("request_id"), v.get("error"))
            && let Some(err_s) = err.as_str()
            && err_s != "success"
        {
            let _ = event_tx
                .send(Event::Player(PlayerEvent::Error(format!(
                    "mpv ipc error: {err_s}"
                ))))
                .await;
        }
        if let Some(pe) = map_mpv_event(&v) {
            let _ = event_tx.send(Event::Player(pe)).await;
        }
    }
    tracing::debug!("mpv ipc stream closed");
}

fn map_mpv_event(v: &Value) -> Option<PlayerEvent> {
    match v.get("event")?.as_str()? {
        "property-change" => {
            let name = v.get("name")?.as_str()?;
            let data = v.get("data").unwrap_or(&Value::Null);
            match name {
                "volume" => data.as_f64().map(PlayerEvent::Volume),
                "current-tracks/video" => {
                    // Absent track: null. Cover art shows up as an "albumart" track.
                    let is_video = data.is_object()
                        && !data
                            .get("albumart")
                            .and_then(Value::as_bool)
                            .unwrap_or(false);
                    Some(PlayerEvent::VideoMode(is_video))
                }
                "metadata" => {
                    let obj = data.as_object()?;
                    let tag = |key: &str| {
                        obj.iter()
                            .find(|(k, _)| k.eq_ignore_ascii_case(key))
                            .and_then(|(_, v)| v.as_str())
                            .map(str::to_string)
                    };
                    Some(PlayerEvent::Metadata {
                        artist: tag("artist"),
                        title: tag("title"),
                    })
                }
                "media-title" => data.as_str().map(|s| PlayerEvent::MediaTitle(s.to_string())),
                "pause" => data.as_bool().map(PlayerEvent::Paused),
                _ => None,
            }
        }
        "file-loaded" => Some(PlayerEvent::FileLoaded),
        "end-file" => {
            // A failed stream ends with reason=error and an "error" string.
            let reason = v.get("reason").and_then(|x| x.as_str()).unwrap_or("");
            if reason == "error" {
                let err = v.get("error").and_then(|x| x.as_str()).unwrap_or("unknown");
                Some(PlayerEvent::Error(format!("mpv end-file error: {err}")))
            } else {
                None
            }
        }
        "log-message" => {
            let level = v.get("level")?.as_str().unwrap_or("info");
            let text = v.get("text")?.as_str().unwrap_or("").trim();
            if (level == "warn" || level == "error") && !text.is_empty() {
                Some(PlayerEvent::Error(format!("mpv {level}: {text}")))
            } else {
                None
            }
        }
        _ => None,
    }
}
