//! The Graph Compiler: extraction batch in, upsert statements out
//!
//! Entity statements come first in input order, then relationship
//! statements in input order. Endpoint labels are resolved against the
//! entities declared in the same batch; the first unresolvable (or
//! malformed) triple stops relationship compilation, but statements
//! compiled up to that point are kept.

use crate::{CoreError, EntityLabel, ExtractionBatch, GraphStatement, RelationType};
use std::collections::HashMap;

/// Normalize an entity id for use as a record key: trim, lowercase, and
/// strip the separators the extraction model tends to mix into ids.
pub fn normalize_id(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_lowercase()
}

/// The result of compiling one batch: everything that compiled, plus the
/// error that stopped relationship compilation early, if any.
#[derive(Debug)]
pub struct CompiledBatch {
    pub statements: Vec<GraphStatement>,
    pub failure: Option<CoreError>,
}

impl CompiledBatch {
    pub fn is_partial(&self) -> bool {
        self.failure.is_some()
    }
}

/// Compile an extraction batch into an ordered sequence of upsert
/// statements.
pub fn compile(batch: &ExtractionBatch) -> CompiledBatch {
    let mut statements = Vec::with_capacity(batch.entities.len() + batch.relationships.len());
    let mut labels: HashMap<String, EntityLabel> = HashMap::new();

    for entity in &batch.entities {
        let id = normalize_id(&entity.id);
        if id.is_empty() {
            return CompiledBatch {
                statements,
                failure: Some(CoreError::EmptyEntityId {
                    label: entity.label.to_string(),
                }),
            };
        }
        labels.insert(id.clone(), entity.label);
        statements.push(GraphStatement::entity(
            entity.label,
            id,
            entity.properties.clone(),
        ));
    }

    for triple in &batch.relationships {
        match compile_relationship(triple, &labels) {
            Ok(statement) => statements.push(statement),
            Err(failure) => {
                return CompiledBatch {
                    statements,
                    failure: Some(failure),
                }
            }
        }
    }

    CompiledBatch {
        statements,
        failure: None,
    }
}

fn compile_relationship(
    triple: &str,
    labels: &HashMap<String, EntityLabel>,
) -> Result<GraphStatement, CoreError> {
    let mut parts = triple.split('|');
    let (source, relation, target) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(s), Some(r), Some(t), None) => (s, r, t),
        _ => return Err(CoreError::MalformedTriple(triple.to_string())),
    };

    let relation = RelationType::from_wire(relation.trim()).ok_or_else(|| {
        CoreError::UnknownRelationType {
            triple: triple.to_string(),
            raw: relation.trim().to_string(),
        }
    })?;

    let source_id = normalize_id(source);
    let target_id = normalize_id(target);

    for id in [&source_id, &target_id] {
        if !labels.contains_key(id) {
            return Err(CoreError::UnknownEndpoint {
                triple: triple.to_string(),
                id: id.clone(),
            });
        }
    }

    Ok(GraphStatement::relationship(relation, source_id, target_id))
}
