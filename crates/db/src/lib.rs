//! Graph store layer for the knowledge-graph chat backend
//!
//! Provides SurrealDB integration: connection bootstrap, schema management,
//! the statement executor, and count/query helpers.

pub mod audit;
pub mod error;
pub mod executor;
pub mod repository;
pub mod schema;

pub use audit::AuditLog;
pub use error::{DbError, Result};
pub use executor::{ExecutionFailure, ExecutionReport, GraphExecutor};
pub use repository::{GraphCounts, Repository};

use std::path::Path;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

/// Database connection type
pub type DbConnection = Surreal<Db>;

/// Initialize database with RocksDB (persistent)
pub async fn init_persistent(path: impl AsRef<Path>) -> Result<DbConnection> {
    let db = Surreal::new::<RocksDb>(path.as_ref()).await?;
    setup_database(&db).await?;
    Ok(db)
}

/// Initialize database in-memory (for testing)
pub async fn init_memory() -> Result<DbConnection> {
    let db = Surreal::new::<Mem>(()).await?;
    setup_database(&db).await?;
    Ok(db)
}

/// Setup database namespace, database, and schema
async fn setup_database(db: &DbConnection) -> Result<()> {
    db.use_ns("kgchat").use_db("graph").await?;
    schema::initialize_schema(db).await?;
    Ok(())
}
