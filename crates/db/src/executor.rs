//! The Graph Executor: applies compiled statements to the store

use crate::{AuditLog, DbConnection, Result};
use kgchat_core::{EntityLabel, EntityUpsert, GraphStatement, RelationType, RelationshipUpsert};
use std::collections::BTreeMap;
use surrealdb::types::RecordId;
use tracing::{instrument, warn};

/// What happened to one batch.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// Statements applied before the batch stopped.
    pub applied: usize,
    /// The statement that stopped the batch, if any. Statements after it
    /// were never attempted; statements before it stay applied.
    pub failure: Option<ExecutionFailure>,
}

#[derive(Debug, Clone)]
pub struct ExecutionFailure {
    pub statement: String,
    pub error: String,
}

/// Applies statements one at a time in compiled order, halting on the
/// first failure. No transaction wraps the batch.
#[derive(Clone)]
pub struct GraphExecutor {
    db: DbConnection,
    audit: AuditLog,
}

impl GraphExecutor {
    pub fn new(db: DbConnection, audit: AuditLog) -> Self {
        Self { db, audit }
    }

    /// Record the batch to the audit log, then apply it.
    #[instrument(skip(self, statements), fields(count = statements.len()))]
    pub async fn apply(&self, statements: &[GraphStatement]) -> Result<ExecutionReport> {
        self.audit.record_batch(statements)?;

        let mut report = ExecutionReport::default();
        for statement in statements {
            match self.apply_one(statement).await {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    let rendered = statement.render();
                    let error = e.to_string();
                    warn!("Statement failed, aborting batch: {} ({})", rendered, error);
                    self.audit.record_failure(&rendered, &error)?;
                    report.failure = Some(ExecutionFailure {
                        statement: rendered,
                        error,
                    });
                    break;
                }
            }
        }

        Ok(report)
    }

    async fn apply_one(&self, statement: &GraphStatement) -> Result<()> {
        match statement {
            GraphStatement::UpsertEntity(entity) => self.upsert_entity(entity).await,
            GraphStatement::UpsertRelationship(rel) => self.upsert_relationship(rel).await,
        }
    }

    /// Merge-on-key: IGNORE leaves an existing record (and its properties)
    /// untouched, so re-applying a batch never updates or duplicates.
    async fn upsert_entity(&self, entity: &EntityUpsert) -> Result<()> {
        let mut data: BTreeMap<String, String> = entity.properties.clone();
        data.insert("id".to_string(), entity.id.clone());

        // Table name must be a literal, so one query per label.
        let query = match entity.label {
            EntityLabel::Person => "INSERT IGNORE INTO person $data",
            EntityLabel::Organization => "INSERT IGNORE INTO organization $data",
            EntityLabel::Technology => "INSERT IGNORE INTO technology $data",
            EntityLabel::University => "INSERT IGNORE INTO university $data",
            EntityLabel::Concept => "INSERT IGNORE INTO concept $data",
        };

        self.db.query(query).bind(("data", data)).await?.check()?;
        Ok(())
    }

    /// RELATE guarded by an existence check on the endpoint pair, so a
    /// re-applied batch does not stack duplicate edges.
    async fn upsert_relationship(&self, rel: &RelationshipUpsert) -> Result<()> {
        let from = RecordId::new(rel.source_label.table(), rel.source_id.clone());
        let to = RecordId::new(rel.target_label.table(), rel.target_id.clone());

        // Edge table name must be a literal in RELATE, so one query per type.
        let query = match rel.relation {
            RelationType::WorkAt => {
                "IF !(SELECT VALUE id FROM work_at WHERE in = $from AND out = $to) { RELATE $from->work_at->$to }"
            }
            RelationType::Develope => {
                "IF !(SELECT VALUE id FROM develope WHERE in = $from AND out = $to) { RELATE $from->develope->$to }"
            }
            RelationType::StudyAt => {
                "IF !(SELECT VALUE id FROM study_at WHERE in = $from AND out = $to) { RELATE $from->study_at->$to }"
            }
            RelationType::Propose => {
                "IF !(SELECT VALUE id FROM propose WHERE in = $from AND out = $to) { RELATE $from->propose->$to }"
            }
            RelationType::Release => {
                "IF !(SELECT VALUE id FROM release WHERE in = $from AND out = $to) { RELATE $from->release->$to }"
            }
            RelationType::IsRelatedTo => {
                "IF !(SELECT VALUE id FROM is_related_to WHERE in = $from AND out = $to) { RELATE $from->is_related_to->$to }"
            }
        };

        self.db
            .query(query)
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .check()?;
        Ok(())
    }
}
