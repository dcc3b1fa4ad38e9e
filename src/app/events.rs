#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Player(PlayerEvent),
    Lyrics(LyricsEvent),
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// mpv volume, may exceed 100 when `volume-max` allows it.
    Volume(f64),
    /// `true` for a real video track, `false` for audio or cover art.
    VideoMode(bool),
    Metadata {
        artist: Option<String>,
        title: Option<String>,
    },
    MediaTitle(String),
    Paused(bool),
    FileLoaded,
    Error(String),
}

#[derive(Debug, Clone)]
pub enum LyricsEvent {
    Loaded {
        request_id: u64,
        meta: crate::lyrics::TrackMetadata,
        lyrics: Option<String>,
    },
}
