//! Lyrics lookup for the current track
//!
//! This module provides:
//! - KKBox and Genius search + page scraping
//! - HTML to plain-text extraction for lyrics containers
//! - An ordered resolver that falls back from one source to the next

pub mod extract;
pub mod genius;
pub mod kkbox;
pub mod names;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LyricsConfig;
pub use extract::extract_lyrics;
pub use genius::GeniusSource;
pub use kkbox::KkboxSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub artist: String,
    pub title: String,
}

impl TrackMetadata {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

/// GET transport used by the sources.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Body of a successful response, `None` for a non-2xx status.
    async fn get_text(&self, url: &str) -> anyhow::Result<Option<String>>;
}

#[async_trait]
impl PageFetcher for reqwest::Client {
    async fn get_text(&self, url: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), %url, "non-success response");
            return Ok(None);
        }
        let body = response.text().await.context("read response body")?;
        Ok(Some(body))
    }
}

/// One lyrics provider.
///
/// `Ok(None)` means the provider had nothing for this track; errors are faults
/// (network, unexpected body) and are treated the same way by the resolver.
#[async_trait]
pub trait LyricsSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, meta: &TrackMetadata) -> anyhow::Result<Option<String>>;
}

pub(crate) async fn fetch_lyrics_page<F: PageFetcher + ?Sized>(
    http: &F,
    url: &str,
) -> anyhow::Result<Option<String>> {
    let Some(html) = http.get_text(url).await? else {
        return Ok(None);
    };
    Ok(extract_lyrics(&html))
}

/// Tries sources in order and returns the first non-empty lyrics.
#[derive(Clone)]
pub struct LyricsResolver {
    sources: Arc<Vec<Box<dyn LyricsSource>>>,
}

impl LyricsResolver {
    pub fn new(sources: Vec<Box<dyn LyricsSource>>) -> Self {
        Self {
            sources: Arc::new(sources),
        }
    }

    pub fn from_config(cfg: &LyricsConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build reqwest client")?;

        let mut sources: Vec<Box<dyn LyricsSource>> = Vec::new();
        for name in &cfg.sources {
            match name.trim().to_ascii_lowercase().as_str() {
                "kkbox" => sources.push(Box::new(KkboxSource::new(http.clone()))),
                "genius" => sources.push(Box::new(GeniusSource::new(http.clone()))),
                other => tracing::warn!(source = other, "unknown lyrics source, skipping"),
            }
        }
        if sources.is_empty() {
            anyhow::bail!("no usable lyrics source in {:?}", cfg.sources);
        }
        Ok(Self::new(sources))
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Never fails: a source fault only moves on to the next source, and total
    /// failure looks exactly like "no lyrics".
    pub async fn resolve(&self, meta: &TrackMetadata) -> Option<String> {
        for source in self.sources.iter() {
            match source.fetch(meta).await {
                Ok(Some(lyrics)) if !lyrics.trim().is_empty() => {
                    tracing::debug!(source = source.name(), "lyrics found");
                    return Some(lyrics);
                }
                Ok(_) => tracing::debug!(source = source.name(), "no lyrics"),
                Err(e) => {
                    tracing::debug!(source = source.name(), error = %format!("{e:#}"), "lyrics source failed")
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Reply {
        Lyrics(&'static str),
        Nothing,
        Fail,
    }

    struct FakeSource {
        name: &'static str,
        reply: Reply,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn boxed(name: &'static str, reply: Reply) -> (Box<dyn LyricsSource>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let src = FakeSource {
                name,
                reply,
                calls: calls.clone(),
            };
            (Box::new(src), calls)
        }
    }

    #[async_trait]
    impl LyricsSource for FakeSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, _meta: &TrackMetadata) -> anyhow::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Lyrics(s) => Ok(Some(s.to_string())),
                Reply::Nothing => Ok(None),
                Reply::Fail => anyhow::bail!("connection reset"),
            }
        }
    }

    /// Serves canned bodies by URL and records every request.
    #[derive(Clone, Default)]
    struct FixtureHttp {
        pages: Arc<HashMap<String, String>>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl FixtureHttp {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: Arc::new(
                    pages
                        .iter()
                        .map(|(u, b)| (u.to_string(), b.to_string()))
                        .collect(),
                ),
                requested: Arc::default(),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for FixtureHttp {
        async fn get_text(&self, url: &str) -> anyhow::Result<Option<String>> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(self.pages.get(url).cloned())
        }
    }

    fn meta() -> TrackMetadata {
        TrackMetadata::new("A", "B")
    }

    #[tokio::test]
    async fn test_first_source_wins() {
        let (a, a_calls) = FakeSource::boxed("a", Reply::Lyrics("La la"));
        let (b, b_calls) = FakeSource::boxed("b", Reply::Lyrics("Oh oh"));
        let resolver = LyricsResolver::new(vec![a, b]);
        assert_eq!(resolver.resolve(&meta()).await.as_deref(), Some("La la"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_no_result_and_fault() {
        for reply in [Reply::Nothing, Reply::Fail, Reply::Lyrics("  \n ")] {
            let (a, _) = FakeSource::boxed("a", reply);
            let (b, b_calls) = FakeSource::boxed("b", Reply::Lyrics("Oh oh"));
            let resolver = LyricsResolver::new(vec![a, b]);
            assert_eq!(resolver.resolve(&meta()).await.as_deref(), Some("Oh oh"));
            assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_total_failure_is_none() {
        let (a, _) = FakeSource::boxed("a", Reply::Fail);
        let (b, _) = FakeSource::boxed("b", Reply::Nothing);
        let resolver = LyricsResolver::new(vec![a, b]);
        assert_eq!(resolver.resolve(&meta()).await, None);
    }

    #[tokio::test]
    async fn test_kkbox_hit_skips_genius() {
        let http = FixtureHttp::new(&[
            (
                "https://www.kkbox.com/api/search/song?q=A%20B",
                r#"{"data":{"result":[{"has_lyrics":true,"url":"https://www.kkbox.com/song/1"}]}}"#,
            ),
            (
                "https://www.kkbox.com/song/1",
                r#"<html><body><div class="lyrics">La la</div></body></html>"#,
            ),
        ]);
        let resolver = LyricsResolver::new(vec![
            Box::new(KkboxSource::new(http.clone())),
            Box::new(GeniusSource::new(http.clone())),
        ]);

        assert_eq!(resolver.resolve(&meta()).await.as_deref(), Some("La la"));
        assert!(http.requested().iter().all(|u| !u.contains("genius.com")));
    }

    #[tokio::test]
    async fn test_genius_used_when_kkbox_has_no_lyrics() {
        let http = FixtureHttp::new(&[
            (
                "https://www.kkbox.com/api/search/song?q=A%20B",
                r#"{"data":{"result":[{"has_lyrics":false,"url":"https://www.kkbox.com/song/1"}]}}"#,
            ),
            (
                "https://genius.com/api/search/multi?per_page=5&q=A%20B",
                r#"{"response":{"sections":[{"type":"song","hits":[{"result":{"url":"https://genius.com/a-b-lyrics"}}]}]}}"#,
            ),
            (
                "https://genius.com/a-b-lyrics",
                r#"<div class="Lyrics__Container-sc-1">Oh <a href="/x">oh</a></div>"#,
            ),
        ]);
        let resolver = LyricsResolver::new(vec![
            Box::new(KkboxSource::new(http.clone())),
            Box::new(GeniusSource::new(http.clone())),
        ]);

        assert_eq!(resolver.resolve(&meta()).await.as_deref(), Some("Oh oh"));
        assert!(!http.requested().contains(&"https://www.kkbox.com/song/1".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_search_means_none() {
        let http = FixtureHttp::new(&[]);
        let resolver = LyricsResolver::new(vec![
            Box::new(KkboxSource::new(http.clone())),
            Box::new(GeniusSource::new(http.clone())),
        ]);
        assert_eq!(resolver.resolve(&meta()).await, None);
        assert_eq!(http.requested().len(), 2);
    }

    #[test]
    fn test_from_config_order_and_unknown_names() {
        let cfg = LyricsConfig {
            sources: vec!["Genius".into(), "azlyrics".into(), "kkbox".into()],
            ..LyricsConfig::default()
        };
        let resolver = LyricsResolver::from_config(&cfg).unwrap();
        assert_eq!(resolver.source_names(), vec!["genius", "kkbox"]);

        let empty = LyricsConfig {
            sources: vec!["nope".into()],
            ..LyricsConfig::default()
        };
        assert!(LyricsResolver::from_config(&empty).is_err());
    }
}
