//! Service agents for the knowledge-graph chat backend
//!
//! This crate contains everything that talks to the outside world:
//! - Extractor: turns text into an entity/relationship batch via the LLM
//! - GraphBuilder: runs the extract -> compile -> execute pipeline
//! - QueryAgent: answers questions by translating them to graph queries
//! - ContentIngestor: normalizes text/URL/file/audio input into stored text

pub mod builder;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod ingest;
pub mod llm;
pub mod prompts;
pub mod qa;
pub mod stt;
pub mod wav;

pub use builder::{BuildOutcome, GraphBuilder};
pub use error::{AgentError, Result};
pub use extractor::Extractor;
pub use fetch::{TranscriptClient, WikipediaClient};
pub use ingest::{ContentIngestor, StoredContent};
pub use llm::LlmClient;
pub use qa::{QueryAgent, QueryOutcome};
pub use stt::SttClient;
