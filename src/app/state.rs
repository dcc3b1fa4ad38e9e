use crate::lyrics::TrackMetadata;

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: std::time::Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    const TTL: std::time::Duration = std::time::Duration::from_secs(3);

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > Self::TTL
    }

    /// When the toast should disappear, on the event-loop clock.
    pub fn expires_at(&self) -> tokio::time::Instant {
        tokio::time::Instant::from_std(self.created_at + Self::TTL)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LyricsPane {
    /// Id of the lookup whose answer we are waiting for; older answers are dropped.
    pub request_id: u64,
    pub loading: bool,
    pub text: Option<String>,
    pub scroll: u16,
}

impl LyricsPane {
    /// Start a new lookup and return its id.
    pub fn begin(&mut self) -> u64 {
        self.request_id += 1;
        self.loading = true;
        self.text = None;
        self.scroll = 0;
        self.request_id
    }

    /// Forget the current lyrics; in-flight replies become stale.
    pub fn clear(&mut self) {
        self.request_id += 1;
        self.loading = false;
        self.text = None;
        self.scroll = 0;
    }

    /// Returns false for a stale reply.
    pub fn finish(&mut self, request_id: u64, text: Option<String>) -> bool {
        if request_id != self.request_id {
            return false;
        }
        self.loading = false;
        self.text = text;
        true
    }

    pub fn scroll_by(&mut self, delta: i16) {
        let max = self
            .text
            .as_deref()
            .map(|t| t.lines().count().saturating_sub(1))
            .unwrap_or(0);
        let next = (self.scroll as i32 + delta as i32).clamp(0, max.min(u16::MAX as usize) as i32);
        self.scroll = next as u16;
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub should_quit: bool,

    // Playback
    pub track: Option<TrackMetadata>,
    pub media_title: Option<String>,
    pub paused: bool,
    pub pointer_over_bar: bool,

    pub show_help: bool,

    pub lyrics: LyricsPane,

    pub toast: Option<Toast>,
    pub status: String,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title line for the player panel.
    pub fn now_playing(&self) -> Option<String> {
        match (&self.track, &self.media_title) {
            (Some(t), _) if !t.artist.is_empty() => Some(format!("{} - {}", t.artist, t.title)),
            (Some(t), _) => Some(t.title.clone()),
            (None, Some(m)) => Some(m.clone()),
            (None, None) => None,
        }
    }
}
