//! Error types for the core domain

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid extraction payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed relationship triple: {0:?}")]
    MalformedTriple(String),

    #[error("Unknown relationship type in triple {triple:?}: {raw}")]
    UnknownRelationType { triple: String, raw: String },

    #[error("Relationship {triple:?} references id {id:?} not declared in this batch")]
    UnknownEndpoint { triple: String, id: String },

    #[error("Entity has an empty id after normalization (label {label})")]
    EmptyEntityId { label: String },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
