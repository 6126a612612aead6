//! Clients for the transcript and document retrieval services

use crate::config::env_or_default;
use crate::{AgentError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

const DEFAULT_TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";
const DEFAULT_WIKIPEDIA_HOST: &str = "https://{lang}.wikipedia.org";

/// Fetches YouTube captions from the public timedtext endpoint.
#[derive(Clone)]
pub struct TranscriptClient {
    client: Client,
    base_url: String,
}

impl TranscriptClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(env_or_default("TIMEDTEXT_URL", DEFAULT_TIMEDTEXT_URL))
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, video_id: &str) -> Result<String> {
        let url = format!("{}?v={}&lang=en&fmt=json3", self.base_url, video_id);

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_timedtext(&body).ok_or_else(|| {
            AgentError::ContentUnavailable(format!(
                "YouTube transcript is not available for video id: {}",
                video_id
            ))
        })
    }
}

/// Join the caption segments of a `fmt=json3` timedtext payload.
pub fn parse_timedtext(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct TimedText {
        #[serde(default)]
        events: Vec<TimedTextEvent>,
    }

    #[derive(Deserialize)]
    struct TimedTextEvent {
        #[serde(default)]
        segs: Vec<TimedTextSeg>,
    }

    #[derive(Deserialize)]
    struct TimedTextSeg {
        #[serde(default)]
        utf8: String,
    }

    let parsed: TimedText = serde_json::from_str(body).ok()?;
    let transcript: String = parsed
        .events
        .iter()
        .flat_map(|event| event.segs.iter())
        .map(|seg| seg.utf8.as_str())
        .collect();

    let transcript = transcript.trim().to_string();
    if transcript.is_empty() {
        None
    } else {
        Some(transcript)
    }
}

/// Fetches the plain-text extract of a Wikipedia article from the REST
/// summary endpoint of the article's language edition.
#[derive(Clone)]
pub struct WikipediaClient {
    client: Client,
    host_template: String,
}

impl WikipediaClient {
    pub fn new(host_template: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            host_template: host_template.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(env_or_default("WIKIPEDIA_HOST", DEFAULT_WIKIPEDIA_HOST))
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, lang: &str, title: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct Summary {
            #[serde(default)]
            extract: String,
        }

        let host = self.host_template.replace("{lang}", lang);
        let url = format!("{}/api/rest_v1/page/summary/{}", host, title);

        let summary = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|_| AgentError::ContentUnavailable("Cannot load Wikipedia page.".into()))?
            .json::<Summary>()
            .await?;

        if summary.extract.is_empty() {
            return Err(AgentError::ContentUnavailable(
                "Cannot load Wikipedia page.".into(),
            ));
        }

        Ok(summary.extract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timedtext_segments() {
        let body = r#"{
            "events": [
                {"segs": [{"utf8": "Hello "}, {"utf8": "world"}]},
                {"tStartMs": 1200},
                {"segs": [{"utf8": ", again"}]}
            ]
        }"#;
        assert_eq!(parse_timedtext(body).as_deref(), Some("Hello world, again"));
    }

    #[test]
    fn empty_or_invalid_timedtext_is_none() {
        assert_eq!(parse_timedtext(""), None);
        assert_eq!(parse_timedtext("{}"), None);
        assert_eq!(parse_timedtext("<transcript/>"), None);
    }

    #[tokio::test]
    #[ignore = "Requires network access to wikipedia.org"]
    async fn fetches_a_live_wikipedia_summary() {
        let client = WikipediaClient::from_env();
        let extract = client.summary("en", "Rust_(programming_language)").await.unwrap();
        assert!(extract.contains("Rust"));
    }
}
