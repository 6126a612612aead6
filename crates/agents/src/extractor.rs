//! Extraction Client: text in, entity/relationship batch out

use crate::config::env_parse;
use crate::{prompts, AgentError, LlmClient, Result};
use kgchat_core::ExtractionBatch;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_PAUSE_SECS: u64 = 3;

/// Sends a document through the extraction prompt and parses the model's
/// JSON payload. A fixed pause follows every call to stay under the
/// generation service's rate limit.
#[derive(Clone)]
pub struct Extractor {
    llm: LlmClient,
    pause: Duration,
}

impl Extractor {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm: llm.with_system_instruction(prompts::EXTRACTION_SYSTEM_INSTRUCTION),
            pause: Duration::from_secs(env_parse("EXTRACT_PAUSE_SECS", DEFAULT_PAUSE_SECS)),
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn extract(&self, text: &str) -> Result<ExtractionBatch> {
        let prompt = prompts::extraction_prompt(text.trim_end());
        let raw = self.llm.generate(&prompt).await?;
        tokio::time::sleep(self.pause).await;

        let payload = trim_to_json_object(&raw).ok_or_else(|| {
            AgentError::Extraction(format!("no JSON object in extraction response: {}", raw))
        })?;

        let batch = ExtractionBatch::from_json(payload)
            .map_err(|e| AgentError::Extraction(e.to_string()))?;

        debug!(
            "Extracted {} entities, {} relationships",
            batch.entities.len(),
            batch.relationships.len()
        );
        Ok(batch)
    }
}

/// Cut a response down to its outermost JSON object. The scan is
/// brace-balance and string aware, so prose before the object, markdown
/// fences, and trailing commentary are all dropped, and braces inside
/// string values do not end the object early.
pub fn trim_to_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_a_bare_object() {
        assert_eq!(trim_to_json_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn strips_prose_and_fences() {
        let raw = "Here is the JSON:\n```json\n{\"entities\": []}\n```\nLet me know!";
        assert_eq!(trim_to_json_object(raw), Some(r#"{"entities": []}"#));
    }

    #[test]
    fn keeps_nested_objects_intact() {
        let raw = r#"noise {"a": {"b": {"c": 1}}, "d": 2} trailing {"unrelated": true}"#;
        assert_eq!(
            trim_to_json_object(raw),
            Some(r#"{"a": {"b": {"c": 1}}, "d": 2}"#)
        );
    }

    #[test]
    fn ignores_braces_inside_strings() {
        let raw = r#"{"text": "curly } brace \" and {more}"}"#;
        assert_eq!(trim_to_json_object(raw), Some(raw));
    }

    #[test]
    fn unbalanced_object_yields_nothing() {
        assert_eq!(trim_to_json_object(r#"{"a": {"b": 1}"#), None);
        assert_eq!(trim_to_json_object("no json here"), None);
    }
}
