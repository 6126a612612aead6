//! Core domain types for the knowledge-graph chat backend
//!
//! This crate defines the fixed entity/relationship vocabulary, the shape of
//! an LLM extraction batch, and the compiler that turns a batch into graph
//! upsert statements.

pub mod compiler;
pub mod error;
pub mod extraction;
pub mod label;
pub mod statement;

pub use compiler::{compile, normalize_id, CompiledBatch};
pub use error::{CoreError, Result};
pub use extraction::{ExtractionBatch, RawEntity};
pub use label::{EntityLabel, RelationType};
pub use statement::{EntityUpsert, GraphStatement, RelationshipUpsert};
