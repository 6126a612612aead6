//! Graph schema definitions

use crate::{DbConnection, Result};
use tracing::info;

/// Initialize the database schema
pub async fn initialize_schema(db: &DbConnection) -> Result<()> {
    info!("Initializing graph schema...");

    db.query(SCHEMA_DEFINITION).await?.check()?;

    info!("Schema initialized successfully");
    Ok(())
}

const SCHEMA_DEFINITION: &str = r#"
-- ============================================
-- ENTITY TABLES
-- ============================================

-- Schemaless: extracted entities carry an open-ended set of string
-- properties alongside their record key.
DEFINE TABLE IF NOT EXISTS person SCHEMALESS;
DEFINE TABLE IF NOT EXISTS organization SCHEMALESS;
DEFINE TABLE IF NOT EXISTS technology SCHEMALESS;
DEFINE TABLE IF NOT EXISTS university SCHEMALESS;
DEFINE TABLE IF NOT EXISTS concept SCHEMALESS;

-- ============================================
-- RELATION TABLES
-- ============================================

-- ENFORCED pins each relationship to existing records of the expected
-- labels; a statement violating this fails at execution time.
DEFINE TABLE IF NOT EXISTS work_at TYPE RELATION IN person OUT organization ENFORCED;
DEFINE TABLE IF NOT EXISTS develope TYPE RELATION IN person OUT technology ENFORCED;
DEFINE TABLE IF NOT EXISTS study_at TYPE RELATION IN person OUT university ENFORCED;
DEFINE TABLE IF NOT EXISTS propose TYPE RELATION IN person OUT concept ENFORCED;
DEFINE TABLE IF NOT EXISTS release TYPE RELATION IN organization OUT technology ENFORCED;
DEFINE TABLE IF NOT EXISTS is_related_to TYPE RELATION IN concept OUT concept ENFORCED;
"#;
