//! Client for the speech-to-text worker service

use crate::config::env_or_default;
use crate::{AgentError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

const DEFAULT_STT_URL: &str = "http://localhost:9000";

/// Posts WAV audio to a transcription worker and returns the transcript.
#[derive(Clone)]
pub struct SttClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    text: String,
}

impl SttClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(env_or_default("STT_URL", DEFAULT_STT_URL))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, wav), fields(bytes = wav.len()))]
    pub async fn transcribe(&self, wav: Vec<u8>) -> Result<String> {
        let url = format!("{}/transcribe", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("content-type", "audio/wav")
            .body(wav)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::ContentUnavailable(format!(
                "Could not request transcription; service returned {}",
                response.status()
            )));
        }

        let body = response.json::<TranscribeResponse>().await?;
        let text = body.text.trim().to_string();

        if text.is_empty() {
            return Err(AgentError::ContentUnavailable(
                "Speech was unintelligible".into(),
            ));
        }

        Ok(text)
    }
}
