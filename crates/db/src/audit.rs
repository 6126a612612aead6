//! Side-files recording compiled statements and execution failures

use kgchat_core::GraphStatement;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Durable record of graph mutations: the most recent batch's compiled
/// statements (overwritten per batch) and every statement that failed
/// execution (appended, timestamped).
#[derive(Debug, Clone)]
pub struct AuditLog {
    statements_path: PathBuf,
    failures_path: PathBuf,
}

impl AuditLog {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            statements_path: dir.join("latest_statements.surql"),
            failures_path: dir.join("failed_statements.log"),
        }
    }

    /// Write the rendered batch before execution starts.
    pub fn record_batch(&self, statements: &[GraphStatement]) -> std::io::Result<()> {
        if let Some(parent) = self.statements_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut rendered = statements
            .iter()
            .map(GraphStatement::render)
            .collect::<Vec<_>>()
            .join("\n");
        rendered.push('\n');
        fs::write(&self.statements_path, rendered)
    }

    /// Append a failed statement with the store's error message.
    pub fn record_failure(&self, statement: &str, error: &str) -> std::io::Result<()> {
        if let Some(parent) = self.failures_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.failures_path)?;
        writeln!(
            file,
            "{}\t{} - {}",
            chrono::Utc::now().to_rfc3339(),
            statement,
            error
        )
    }

    pub fn statements_path(&self) -> &Path {
        &self.statements_path
    }

    pub fn failures_path(&self) -> &Path {
        &self.failures_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgchat_core::{EntityLabel, GraphStatement};
    use std::collections::BTreeMap;

    #[test]
    fn batch_log_is_overwritten_per_batch() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::new(dir.path());

        let first = vec![GraphStatement::entity(
            EntityLabel::Person,
            "alice",
            BTreeMap::new(),
        )];
        let second = vec![GraphStatement::entity(
            EntityLabel::Concept,
            "ownership",
            BTreeMap::new(),
        )];

        audit.record_batch(&first).unwrap();
        audit.record_batch(&second).unwrap();

        let content = std::fs::read_to_string(audit.statements_path()).unwrap();
        assert!(content.contains("concept"));
        assert!(!content.contains("alice"));
    }

    #[test]
    fn failures_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::new(dir.path());

        audit.record_failure("INSERT ...", "boom").unwrap();
        audit.record_failure("RELATE ...", "bang").unwrap();

        let content = std::fs::read_to_string(audit.failures_path()).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("boom"));
        assert!(content.contains("bang"));
    }
}
