//! The ingestion pipeline: extract -> compile -> audit -> execute

use crate::{Extractor, Result};
use kgchat_core::{compile, ExtractionBatch};
use kgchat_db::{ExecutionFailure, GraphCounts, GraphExecutor, Repository};
use tracing::{info, instrument, warn};

/// Drives one document through the full graph-construction pipeline.
#[derive(Clone)]
pub struct GraphBuilder {
    extractor: Extractor,
    executor: GraphExecutor,
    repo: Repository,
}

/// What one document did to the graph.
#[derive(Debug)]
pub struct BuildOutcome {
    /// Statements compiled from the batch.
    pub compiled: usize,
    /// Statements actually applied to the store.
    pub applied: usize,
    /// Why relationship compilation stopped early, if it did.
    pub compile_failure: Option<String>,
    /// The statement that stopped execution, if any.
    pub execution_failure: Option<ExecutionFailure>,
    /// Store totals after the batch.
    pub counts: GraphCounts,
}

impl GraphBuilder {
    pub fn new(extractor: Extractor, executor: GraphExecutor, repo: Repository) -> Self {
        Self {
            extractor,
            executor,
            repo,
        }
    }

    /// Extract a batch from text and apply it.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn construct_from_text(&self, text: &str) -> Result<BuildOutcome> {
        let batch = self.extractor.extract(text).await?;
        self.apply_batch(batch).await
    }

    /// Compile and apply an already-extracted batch.
    pub async fn apply_batch(&self, batch: ExtractionBatch) -> Result<BuildOutcome> {
        let compiled = compile(&batch);

        let compile_failure = compiled.failure.as_ref().map(|e| e.to_string());
        if let Some(reason) = &compile_failure {
            // Entity statements compiled before the failure still apply.
            warn!("Relationship compilation stopped early: {}", reason);
        }

        let report = self.executor.apply(&compiled.statements).await?;
        let counts = self.repo.counts().await?;

        info!(
            "Batch done: {}/{} statements applied ({} entities, {} relationships in store)",
            report.applied,
            compiled.statements.len(),
            counts.entities,
            counts.relationships
        );

        Ok(BuildOutcome {
            compiled: compiled.statements.len(),
            applied: report.applied,
            compile_failure,
            execution_failure: report.failure,
            counts,
        })
    }
}
