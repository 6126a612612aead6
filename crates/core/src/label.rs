//! The fixed entity and relationship vocabulary of the graph

use serde::{Deserialize, Serialize};

/// Entity labels the extraction model is allowed to produce.
///
/// Each label is backed by one graph table, named after the lowercase form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Organization,
    Technology,
    University,
    Concept,
}

impl EntityLabel {
    /// All labels, in the order they appear in the extraction instructions.
    pub const ALL: [EntityLabel; 5] = [
        EntityLabel::Person,
        EntityLabel::Organization,
        EntityLabel::Technology,
        EntityLabel::University,
        EntityLabel::Concept,
    ];

    /// The graph table backing this label.
    pub fn table(&self) -> &'static str {
        match self {
            EntityLabel::Person => "person",
            EntityLabel::Organization => "organization",
            EntityLabel::Technology => "technology",
            EntityLabel::University => "university",
            EntityLabel::Concept => "concept",
        }
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Relationship types the extraction model is allowed to produce.
///
/// The serialized forms (`WORK_AT`, `DEVELOPE`, ...) are the wire constants
/// of the extraction contract and must not be renamed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    WorkAt,
    Develope,
    StudyAt,
    Propose,
    Release,
    IsRelatedTo,
}

impl RelationType {
    /// All relationship types, in the order they appear in the extraction
    /// instructions.
    pub const ALL: [RelationType; 6] = [
        RelationType::WorkAt,
        RelationType::Develope,
        RelationType::StudyAt,
        RelationType::Propose,
        RelationType::Release,
        RelationType::IsRelatedTo,
    ];

    /// The edge table backing this relationship type.
    pub fn table(&self) -> &'static str {
        match self {
            RelationType::WorkAt => "work_at",
            RelationType::Develope => "develope",
            RelationType::StudyAt => "study_at",
            RelationType::Propose => "propose",
            RelationType::Release => "release",
            RelationType::IsRelatedTo => "is_related_to",
        }
    }

    /// The wire constant used in `source|TYPE|target` triples.
    pub fn wire_name(&self) -> &'static str {
        match self {
            RelationType::WorkAt => "WORK_AT",
            RelationType::Develope => "DEVELOPE",
            RelationType::StudyAt => "STUDY_AT",
            RelationType::Propose => "PROPOSE",
            RelationType::Release => "RELEASE",
            RelationType::IsRelatedTo => "IS_RELATED_TO",
        }
    }

    /// Parse the wire constant.
    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.wire_name() == raw)
    }

    /// The entity labels this relationship runs between (in, out).
    pub fn endpoints(&self) -> (EntityLabel, EntityLabel) {
        match self {
            RelationType::WorkAt => (EntityLabel::Person, EntityLabel::Organization),
            RelationType::Develope => (EntityLabel::Person, EntityLabel::Technology),
            RelationType::StudyAt => (EntityLabel::Person, EntityLabel::University),
            RelationType::Propose => (EntityLabel::Person, EntityLabel::Concept),
            RelationType::Release => (EntityLabel::Organization, EntityLabel::Technology),
            RelationType::IsRelatedTo => (EntityLabel::Concept, EntityLabel::Concept),
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}
