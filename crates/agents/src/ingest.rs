//! Content Ingestor: normalize any accepted input into a stored text blob

use crate::{wav, AgentError, Result, SttClient, TranscriptClient, WikipediaClient};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use url::Url;

/// URL content is capped to this many characters before extraction.
const URL_CONTENT_CAP: usize = 1000;
/// Audio uploads are clipped to this many seconds before transcription.
const AUDIO_SECONDS_CAP: u32 = 60;

/// A normalized input, persisted under the upload directory.
#[derive(Debug, Clone)]
pub struct StoredContent {
    pub path: PathBuf,
    pub text: String,
}

/// Accepts inline text, YouTube/Wikipedia URLs, plain-text files, and WAV
/// audio, and turns each into a text file ready for extraction.
#[derive(Clone)]
pub struct ContentIngestor {
    upload_dir: PathBuf,
    transcripts: TranscriptClient,
    wikipedia: WikipediaClient,
    stt: SttClient,
}

impl ContentIngestor {
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        transcripts: TranscriptClient,
        wikipedia: WikipediaClient,
        stt: SttClient,
    ) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            transcripts,
            wikipedia,
            stt,
        }
    }

    pub fn from_env(upload_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            upload_dir,
            TranscriptClient::from_env(),
            WikipediaClient::from_env(),
            SttClient::from_env(),
        )
    }

    /// Persist inline text as-is.
    #[instrument(skip(self, text))]
    pub async fn ingest_text(&self, text: &str) -> Result<StoredContent> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AgentError::InvalidInput("Empty input.".into()));
        }
        self.persist("text", text)
    }

    /// Resolve a YouTube or Wikipedia URL to its first 1000 characters of
    /// ASCII content and persist that.
    #[instrument(skip(self))]
    pub async fn ingest_url(&self, raw_url: &str) -> Result<StoredContent> {
        if let Some(video_id) = youtube_video_id(raw_url) {
            let transcript = self.transcripts.fetch(&video_id).await?;
            let content = clip_chars(&ascii_only(&transcript), URL_CONTENT_CAP);
            return self.persist(&format!("youtube-{}", video_id), &content);
        }

        if let Some((lang, title)) = wikipedia_article(raw_url) {
            let extract = self.wikipedia.summary(&lang, &title).await?;
            let content = clip_chars(&ascii_only(&extract), URL_CONTENT_CAP);
            return self.persist(&format!("wiki-{}", sanitize_stem(&title)), &content);
        }

        Err(AgentError::Unsupported(
            "Only YouTube and Wikipedia URLs are supported.".into(),
        ))
    }

    /// Persist an uploaded file: plain text directly, WAV via the
    /// speech-to-text service. Anything else is rejected before the
    /// extraction pipeline is ever involved.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn ingest_file(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredContent> {
        let stem = sanitize_stem(file_stem(filename));

        match content_type {
            "text/plain" => {
                let text = String::from_utf8(bytes)
                    .map_err(|_| AgentError::InvalidInput("File is not valid UTF-8.".into()))?;
                if text.trim().is_empty() {
                    return Err(AgentError::InvalidInput("Empty input.".into()));
                }
                self.persist(&stem, &text)
            }
            "audio/wav" => {
                let clipped = wav::clip_seconds(&bytes, AUDIO_SECONDS_CAP)?;
                let transcript = self.stt.transcribe(clipped).await?;
                self.persist(&stem, &transcript)
            }
            other => Err(AgentError::Unsupported(format!(
                "Unsupported file type: {}",
                other
            ))),
        }
    }

    /// Write content to a fresh file. Names carry a timestamp and a random
    /// suffix, so concurrent uploads never collide.
    fn persist(&self, stem: &str, text: &str) -> Result<StoredContent> {
        fs::create_dir_all(&self.upload_dir)?;

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let name = format!(
            "{}-{}-{}.txt",
            stem,
            chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ"),
            &suffix[..8]
        );
        let path = self.upload_dir.join(name);

        fs::write(&path, text)?;
        info!("Stored {} chars at {}", text.len(), path.display());

        Ok(StoredContent {
            path,
            text: text.to_string(),
        })
    }
}

/// Extract the 11-character video id from a YouTube watch/short/embed URL.
pub fn youtube_video_id(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.");

    let candidate = if host == "youtu.be" {
        parsed.path_segments()?.last()?.to_string()
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        match parsed.query_pairs().find(|(key, _)| key == "v") {
            Some((_, value)) => value.to_string(),
            None => parsed.path_segments()?.last()?.to_string(),
        }
    } else {
        return None;
    };

    let id_pattern = Regex::new(r"^[0-9A-Za-z_-]{11}$").ok()?;
    if id_pattern.is_match(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Extract (language, title) from a Wikipedia article URL.
pub fn wikipedia_article(raw: &str) -> Option<(String, String)> {
    let pattern =
        Regex::new(r"^https?://(?:www\.)?([a-zA-Z]{2,3})\.wikipedia\.org/wiki/(.+)$").ok()?;
    let captures = pattern.captures(raw.trim())?;
    Some((
        captures.get(1)?.as_str().to_lowercase(),
        captures.get(2)?.as_str().to_string(),
    ))
}

fn ascii_only(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

fn clip_chars(text: &str, cap: usize) -> String {
    text.chars().take(cap).collect()
}

fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("upload")
}

fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingestor(dir: &Path) -> ContentIngestor {
        ContentIngestor::from_env(dir)
    }

    #[tokio::test]
    async fn inline_text_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let stored = ingestor(dir.path())
            .ingest_text("Alice works at Acme.")
            .await
            .unwrap();

        assert_eq!(stored.text, "Alice works at Acme.");
        assert_eq!(fs::read_to_string(&stored.path).unwrap(), "Alice works at Acme.");
    }

    #[tokio::test]
    async fn stored_names_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let ingestor = ingestor(dir.path());

        let first = ingestor.ingest_text("one").await.unwrap();
        let second = ingestor.ingest_text("two").await.unwrap();
        assert_ne!(first.path, second.path);
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = ingestor(dir.path()).ingest_text("   \n").await;
        assert!(matches!(result, Err(AgentError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn unsupported_file_type_is_rejected_without_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let result = ingestor(dir.path())
            .ingest_file("slides.pdf", "application/pdf", vec![1, 2, 3])
            .await;

        assert!(matches!(result, Err(AgentError::Unsupported(_))));
        assert!(fs::read_dir(dir.path()).map(|mut d| d.next().is_none()).unwrap_or(true));
    }

    #[tokio::test]
    async fn plain_text_file_is_stored() {
        let dir = tempfile::tempdir().unwrap();
        let stored = ingestor(dir.path())
            .ingest_file("notes.txt", "text/plain", b"Bob studied at MIT.".to_vec())
            .await
            .unwrap();

        assert_eq!(stored.text, "Bob studied at MIT.");
        let name = stored.path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("notes-"));
    }

    #[test]
    fn recognizes_youtube_urls() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            youtube_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            youtube_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(youtube_video_id("https://www.youtube.com/watch?v=tooshort"), None);
        assert_eq!(youtube_video_id("https://vimeo.com/1234567"), None);
        assert_eq!(youtube_video_id("not a url"), None);
    }

    #[test]
    fn recognizes_wikipedia_urls() {
        assert_eq!(
            wikipedia_article("https://en.wikipedia.org/wiki/Alan_Turing"),
            Some(("en".to_string(), "Alan_Turing".to_string()))
        );
        assert_eq!(
            wikipedia_article("https://de.wikipedia.org/wiki/Kurt_G%C3%B6del"),
            Some(("de".to_string(), "Kurt_G%C3%B6del".to_string()))
        );
        assert_eq!(wikipedia_article("https://en.wikipedia.org/w/index.php?title=X"), None);
        assert_eq!(wikipedia_article("https://example.com/wiki/Foo"), None);
    }

    #[test]
    fn ascii_filter_and_cap() {
        assert_eq!(ascii_only("naïve café"), "nave caf");
        assert_eq!(clip_chars("abcdef", 3), "abc");
    }

    #[test]
    fn stems_are_sanitized() {
        assert_eq!(sanitize_stem("my notes (v2)"), "my-notes--v2-");
        assert_eq!(sanitize_stem(""), "upload");
        assert_eq!(file_stem("dir/talk.wav"), "talk");
    }
}
