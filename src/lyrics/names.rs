//! Track name cleanup before hitting search endpoints.
//!
//! YouTube Music titles often carry decorations ("(Official Music Video)",
//! "Artist - Topic", "ArtistVEVO") that throw off lyrics search.

use once_cell::sync::Lazy;
use regex::Regex;

use super::TrackMetadata;

static DECORATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\((?:official)? ?(?:music)? ?(?:lyrics?)? ?(?:video)?\)$")
        .expect("valid decoration regex")
});

const SUFFIXES: [&str; 4] = [" - topic", "vevo", " (performance video)", " (clip officiel)"];

pub fn cleanup_name(name: &str) -> String {
    let name = DECORATION.replace(name.trim(), "");
    let name = name.trim_end();
    for suffix in SUFFIXES {
        if let Some(cut) = name.len().checked_sub(suffix.len())
            && name.is_char_boundary(cut)
            && name[cut..].eq_ignore_ascii_case(suffix)
        {
            return name[..cut].trim_end().to_string();
        }
    }
    name.to_string()
}

/// "artist title" query shared by every source.
pub fn search_query(meta: &TrackMetadata) -> String {
    format!("{} {}", cleanup_name(&meta.artist), cleanup_name(&meta.title))
        .trim()
        .to_string()
}

/// Guess artist and title from a bare media title such as "Artist - Title".
/// Used when the stream carries no metadata tags.
pub fn split_media_title(media_title: &str) -> Option<TrackMetadata> {
    let (artist, title) = media_title.split_once(" - ")?;
    let (artist, title) = (artist.trim(), title.trim());
    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some(TrackMetadata::new(artist, title))
}
