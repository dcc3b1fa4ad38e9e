//! Genius lyrics source (fallback).

use async_trait::async_trait;
use serde::Deserialize;

use super::{LyricsSource, PageFetcher, TrackMetadata, fetch_lyrics_page, names};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: Option<SearchPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    result: Option<HitResult>,
}

#[derive(Debug, Deserialize)]
struct HitResult {
    url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeniusSource<F = reqwest::Client> {
    http: F,
    base_url: String,
}

impl<F: PageFetcher> GeniusSource<F> {
    const DEFAULT_BASE_URL: &'static str = "https://genius.com/api";
    const PER_PAGE: u32 = 5;

    pub fn new(http: F) -> Self {
        Self {
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search/multi?per_page={}&q={}",
            self.base_url,
            Self::PER_PAGE,
            urlencoding::encode(query)
        )
    }
}

/// First hit of the first "song" section. Later song sections are not consulted.
fn pick_song_url(body: &str) -> anyhow::Result<Option<String>> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    let url = resp
        .response
        .unwrap_or_default()
        .sections
        .into_iter()
        .find(|section| section.kind == "song")
        .and_then(|section| section.hits.into_iter().next())
        .and_then(|hit| hit.result)
        .and_then(|result| result.url);
    Ok(url)
}

#[async_trait]
impl<F: PageFetcher> LyricsSource for GeniusSource<F> {
    fn name(&self) -> &'static str {
        "genius"
    }

    async fn fetch(&self, meta: &TrackMetadata) -> anyhow::Result<Option<String>> {
        let query = names::search_query(meta);
        tracing::debug!(%query, "searching on Genius");

        let Some(body) = self.http.get_text(&self.search_url(&query)).await? else {
            return Ok(None);
        };
        let Some(url) = pick_song_url(&body)? else {
            return Ok(None);
        };

        tracing::debug!(%url, "fetching lyrics from Genius");
        fetch_lyrics_page(&self.http, &url).await
    }
}
