//! Count and read-only query helpers over the graph store

use crate::{DbConnection, Result};
use kgchat_core::{EntityLabel, RelationType};
use serde::{Deserialize, Serialize};
use surrealdb::types::{SurrealValue, ToSql};
use tracing::instrument;

/// Repository for read operations used by the query service and the
/// info/upload responses.
#[derive(Clone)]
pub struct Repository {
    db: DbConnection,
}

/// Current totals across all entity and relation tables.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GraphCounts {
    pub entities: i64,
    pub relationships: i64,
}

#[derive(Debug, Deserialize, SurrealValue)]
struct CountRow {
    count: i64,
}

impl Repository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// The underlying connection, for callers that need raw access.
    pub fn connection(&self) -> &DbConnection {
        &self.db
    }

    /// Count entities and relationships across every table.
    #[instrument(skip(self))]
    pub async fn counts(&self) -> Result<GraphCounts> {
        let mut query = String::new();
        for label in EntityLabel::ALL {
            query.push_str(&format!("SELECT count() FROM {} GROUP ALL;\n", label.table()));
        }
        for relation in RelationType::ALL {
            query.push_str(&format!(
                "SELECT count() FROM {} GROUP ALL;\n",
                relation.table()
            ));
        }

        let mut response = self.db.query(query).await?.check()?;

        // Empty tables yield no row at all, so sum per-statement in Rust
        // rather than adding possibly-missing values in the query.
        let mut counts = GraphCounts::default();
        for index in 0..EntityLabel::ALL.len() {
            let rows: Vec<CountRow> = response.take(index)?;
            counts.entities += rows.first().map(|r| r.count).unwrap_or(0);
        }
        for offset in 0..RelationType::ALL.len() {
            let rows: Vec<CountRow> = response.take(EntityLabel::ALL.len() + offset)?;
            counts.relationships += rows.first().map(|r| r.count).unwrap_or(0);
        }

        Ok(counts)
    }

    /// Execute an already-validated read-only query and render each
    /// statement's result set. The caller is responsible for keyword
    /// validation; this surfaces any store-side error as-is.
    #[instrument(skip(self))]
    pub async fn run_query(&self, query: &str) -> Result<Vec<String>> {
        let mut response = self.db.query(query).await?.check()?;

        let mut results = Vec::with_capacity(response.num_statements());
        for index in 0..response.num_statements() {
            let value: surrealdb::types::Value = response.take(index)?;
            results.push(value.to_sql());
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_memory;

    #[tokio::test]
    async fn counts_start_at_zero() {
        let repo = Repository::new(init_memory().await.unwrap());
        let counts = repo.counts().await.unwrap();
        assert_eq!(counts.entities, 0);
        assert_eq!(counts.relationships, 0);
    }

    #[tokio::test]
    async fn counts_span_all_tables() {
        let db = init_memory().await.unwrap();
        db.query("INSERT INTO person { id: 'alice' }; INSERT INTO concept { id: 'ownership' };")
            .await
            .unwrap()
            .check()
            .unwrap();

        let repo = Repository::new(db);
        let counts = repo.counts().await.unwrap();
        assert_eq!(counts.entities, 2);
    }

    #[tokio::test]
    async fn run_query_renders_result_rows() {
        let db = init_memory().await.unwrap();
        db.query("INSERT INTO person { id: 'alice', name: 'Alice' };")
            .await
            .unwrap()
            .check()
            .unwrap();

        let repo = Repository::new(db);
        let results = repo
            .run_query("SELECT name FROM person")
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].contains("Alice"));
    }

    #[tokio::test]
    async fn run_query_surfaces_store_errors() {
        let repo = Repository::new(init_memory().await.unwrap());
        assert!(repo.run_query("SELECT FROM WHERE").await.is_err());
    }
}
