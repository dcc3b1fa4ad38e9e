//! KKBox lyrics source (tried first).

use async_trait::async_trait;
use serde::Deserialize;

use super::{LyricsSource, PageFetcher, TrackMetadata, fetch_lyrics_page, names};

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchData {
    #[serde(default)]
    result: Vec<SongEntry>,
}

#[derive(Debug, Deserialize)]
struct SongEntry {
    #[serde(default)]
    has_lyrics: bool,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct KkboxSource<F = reqwest::Client> {
    http: F,
    base_url: String,
}

impl<F: PageFetcher> KkboxSource<F> {
    const DEFAULT_BASE_URL: &'static str = "https://www.kkbox.com/api";

    pub fn new(http: F) -> Self {
        Self {
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/search/song?q={}", self.base_url, urlencoding::encode(query))
    }
}

/// First search entry flagged as having lyrics.
fn pick_song_url(body: &str) -> anyhow::Result<Option<String>> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    Ok(resp
        .data
        .unwrap_or_default()
        .result
        .into_iter()
        .find(|entry| entry.has_lyrics)
        .and_then(|entry| entry.url))
}

#[async_trait]
impl<F: PageFetcher> LyricsSource for KkboxSource<F> {
    fn name(&self) -> &'static str {
        "kkbox"
    }

    async fn fetch(&self, meta: &TrackMetadata) -> anyhow::Result<Option<String>> {
        let query = names::search_query(meta);
        tracing::debug!(%query, "searching on KKBox");

        let Some(body) = self.http.get_text(&self.search_url(&query)).await? else {
            return Ok(None);
        };
        let Some(url) = pick_song_url(&body)? else {
            return Ok(None);
        };

        tracing::debug!(%url, "fetching lyrics from KKBox");
        fetch_lyrics_page(&self.http, &url).await
    }
}
