//! Graph upsert statements produced by the compiler

use crate::{EntityLabel, RelationType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upsert one entity record: create it with all properties if absent,
/// match it untouched if present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityUpsert {
    pub label: EntityLabel,
    /// Normalized record key.
    pub id: String,
    pub properties: BTreeMap<String, String>,
}

/// Upsert one directed edge between two entity records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationshipUpsert {
    pub relation: RelationType,
    pub source_label: EntityLabel,
    /// Normalized source record key.
    pub source_id: String,
    pub target_label: EntityLabel,
    /// Normalized target record key.
    pub target_id: String,
}

/// A single idempotent graph mutation. Values are carried as structured
/// data and bound as query parameters at execution time; the rendered text
/// exists for the audit log and for humans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GraphStatement {
    UpsertEntity(EntityUpsert),
    UpsertRelationship(RelationshipUpsert),
}

impl GraphStatement {
    pub fn entity(label: EntityLabel, id: impl Into<String>, properties: BTreeMap<String, String>) -> Self {
        GraphStatement::UpsertEntity(EntityUpsert {
            label,
            id: id.into(),
            properties,
        })
    }

    pub fn relationship(
        relation: RelationType,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        let (source_label, target_label) = relation.endpoints();
        GraphStatement::UpsertRelationship(RelationshipUpsert {
            relation,
            source_label,
            source_id: source_id.into(),
            target_label,
            target_id: target_id.into(),
        })
    }

    /// Deterministic SurrealQL text mirroring what the executor runs, used
    /// for the statement audit log.
    pub fn render(&self) -> String {
        match self {
            GraphStatement::UpsertEntity(e) => {
                let mut fields = vec![format!("id: '{}'", escape(&e.id))];
                for (key, value) in &e.properties {
                    fields.push(format!("{}: '{}'", key, escape(value)));
                }
                format!("INSERT IGNORE INTO {} {{ {} }};", e.label.table(), fields.join(", "))
            }
            GraphStatement::UpsertRelationship(r) => {
                let source = format!("{}:`{}`", r.source_label.table(), r.source_id);
                let target = format!("{}:`{}`", r.target_label.table(), r.target_id);
                format!(
                    "IF !(SELECT VALUE id FROM {table} WHERE in = {source} AND out = {target}) {{ RELATE {source}->{table}->{target} }};",
                    table = r.relation.table(),
                    source = source,
                    target = target,
                )
            }
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_entity_with_properties() {
        let mut props = BTreeMap::new();
        props.insert("name".to_string(), "Alice".to_string());
        props.insert("dob".to_string(), "1970".to_string());

        let stmt = GraphStatement::entity(EntityLabel::Person, "alice", props);
        assert_eq!(
            stmt.render(),
            "INSERT IGNORE INTO person { id: 'alice', dob: '1970', name: 'Alice' };"
        );
    }

    #[test]
    fn renders_relationship_with_endpoint_tables() {
        let stmt = GraphStatement::relationship(RelationType::WorkAt, "alice", "acme");
        let rendered = stmt.render();
        assert!(rendered.contains("RELATE person:`alice`->work_at->organization:`acme`"));
        assert!(rendered.starts_with("IF !(SELECT VALUE id FROM work_at"));
    }

    #[test]
    fn escapes_quotes_in_property_values() {
        let mut props = BTreeMap::new();
        props.insert("description".to_string(), "maker of 'things'".to_string());

        let stmt = GraphStatement::entity(EntityLabel::Organization, "acme", props);
        assert!(stmt.render().contains("maker of \\'things\\'"));
    }
}
