//! LLM text-generation client (Gemini REST API or a local Ollama endpoint)

use crate::config::{env_or_default, env_parse};
use crate::{AgentError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_PROVIDER: &str = "gemini";
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "phi4-mini:latest";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const MAX_OUTPUT_TOKENS: u32 = 10_000;

/// Client for the text-generation service. Every request runs with zero
/// sampling temperature; Gemini requests additionally carry the fixed
/// permissive safety configuration the extraction contract relies on.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    provider: Provider,
    base_url: String,
    model: String,
    api_key: String,
    system_instruction: Option<String>,
    timeout: Duration,
}

#[derive(Clone, Copy)]
enum Provider {
    Gemini,
    Ollama,
}

impl LlmClient {
    /// Build a client from `LLM_PROVIDER` and the provider's own
    /// environment variables.
    pub fn from_env() -> Self {
        let provider = env_or_default("LLM_PROVIDER", DEFAULT_PROVIDER);
        let timeout = Duration::from_secs(env_parse("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));

        if provider.eq_ignore_ascii_case("ollama") {
            Self {
                client: Client::new(),
                provider: Provider::Ollama,
                base_url: env_or_default("OLLAMA_URL", DEFAULT_OLLAMA_URL),
                model: env_or_default("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
                api_key: String::new(),
                system_instruction: None,
                timeout,
            }
        } else {
            Self {
                client: Client::new(),
                provider: Provider::Gemini,
                base_url: env_or_default("GEMINI_URL", DEFAULT_GEMINI_URL),
                model: env_or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                api_key: env_or_default("GEMINI_KEY", ""),
                system_instruction: None,
                timeout,
            }
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One blocking text-in/text-out generation call.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        match self.provider {
            Provider::Gemini => self.gemini_generate(prompt).await,
            Provider::Ollama => self.ollama_generate(prompt).await,
        }
    }

    async fn gemini_generate(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(AgentError::Llm(
                "GEMINI_KEY is not set; export it or switch LLM_PROVIDER to ollama".into(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.0,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
            safety_settings: safety_settings(),
            system_instruction: self.system_instruction.as_ref().map(|text| GeminiContent {
                parts: vec![GeminiPart { text: text.clone() }],
            }),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<GeminiResponse>()
            .await?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Llm("Gemini returned no candidates".into()))?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(AgentError::Llm("Gemini returned an empty response".into()));
        }

        debug!("Gemini returned {} chars", text.len());
        Ok(text)
    }

    async fn ollama_generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let prompt = match &self.system_instruction {
            Some(instruction) => format!("{}\n\n{}", instruction, prompt),
            None => prompt.to_string(),
        };

        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            options: serde_json::json!({ "temperature": 0 }),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<OllamaGenerateResponse>()
            .await?;

        Ok(response.response)
    }
}

/// The fixed safety configuration: nothing in an uploaded document should
/// be withheld from extraction.
fn safety_settings() -> Vec<GeminiSafetySetting> {
    [
        "HARM_CATEGORY_DANGEROUS",
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| GeminiSafetySetting {
        category: category.to_string(),
        threshold: "BLOCK_NONE".to_string(),
    })
    .collect()
}

// ==========================================
// REQUEST/RESPONSE TYPES
// ==========================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    safety_settings: Vec<GeminiSafetySetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct GeminiSafetySetting {
    category: String,
    threshold: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: serde_json::Value,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_request_uses_wire_field_names() {
        let request = GeminiRequest {
            contents: vec![],
            generation_config: GeminiGenerationConfig {
                temperature: 0.0,
                max_output_tokens: 10,
            },
            safety_settings: safety_settings(),
            system_instruction: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("generationConfig").is_some());
        assert!(json["generationConfig"].get("maxOutputTokens").is_some());
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 5);
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn gemini_response_parses_candidates() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "hello "}, {"text": "world"}]}}
            ]
        }"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        let text: String = response.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "hello world");
    }
}
