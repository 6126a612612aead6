//! The JSON payload an extraction call returns

use crate::{CoreError, EntityLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One extracted entity: a label, an id, and whatever extra string
/// properties the model chose to fill in (`name`, `dob`, `description`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEntity {
    pub label: EntityLabel,
    pub id: String,

    /// Everything other than `label` and `id`.
    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
}

/// The entities and relationships extracted from one document.
///
/// Relationships arrive as `"source|TYPE|target"` strings referencing entity
/// ids declared in the same payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionBatch {
    #[serde(default)]
    pub entities: Vec<RawEntity>,
    #[serde(default)]
    pub relationships: Vec<String>,
}

impl ExtractionBatch {
    /// Parse a batch from raw JSON text. Fails on anything that is not a
    /// JSON object with the expected shape; compilation never starts on a
    /// payload that did not parse.
    pub fn from_json(payload: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }
}
