//! Per-edge relationship choices.

use super::RelationshipKind;
use crate::graph::{Edge, EdgeKey, RelationshipGraph};
use crate::schema::Table;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How a foreign-key relationship is represented in the document model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipChoice {
    /// Keep the child as its own collection, linked by key.
    #[default]
    Reference,
    /// Nest the child rows as an array in the parent.
    EmbedArray,
    /// Nest the child row as a single sub-document in the parent.
    EmbedSingle,
}

impl RelationshipChoice {
    /// Check if this choice embeds the child.
    pub fn is_embed(&self) -> bool {
        self.kind().is_some()
    }

    /// Embedded shape, or `None` for a reference.
    pub fn kind(&self) -> Option<RelationshipKind> {
        match self {
            RelationshipChoice::Reference => None,
            RelationshipChoice::EmbedArray => Some(RelationshipKind::Array),
            RelationshipChoice::EmbedSingle => Some(RelationshipKind::Single),
        }
    }
}

impl std::fmt::Display for RelationshipChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipChoice::Reference => write!(f, "reference"),
            RelationshipChoice::EmbedArray => write!(f, "embed (array)"),
            RelationshipChoice::EmbedSingle => write!(f, "embed (single)"),
        }
    }
}

/// Flat, serializable form of one choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceEntry {
    /// Child table.
    pub child: String,
    /// Parent table.
    pub parent: String,
    /// Foreign key constraint name.
    pub constraint: String,
    /// Chosen representation.
    pub choice: RelationshipChoice,
}

/// Relationship choices keyed by edge.
///
/// Owned by the caller; the engine works on its own copy. Edges without an
/// entry are treated as [`RelationshipChoice::Reference`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ChoiceEntry>", into = "Vec<ChoiceEntry>")]
pub struct ChoiceSet {
    choices: BTreeMap<EdgeKey, RelationshipChoice>,
}

impl ChoiceSet {
    /// Create an empty choice set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a choice, replacing any earlier one for the same edge.
    pub fn set(&mut self, key: EdgeKey, choice: RelationshipChoice) {
        self.choices.insert(key, choice);
    }

    /// Builder form of [`ChoiceSet::set`].
    pub fn with(mut self, key: EdgeKey, choice: RelationshipChoice) -> Self {
        self.set(key, choice);
        self
    }

    /// Explicit choice for an edge, if any.
    pub fn get(&self, key: &EdgeKey) -> Option<RelationshipChoice> {
        self.choices.get(key).copied()
    }

    /// Effective choice for an edge, defaulting to a reference.
    pub fn choice_for(&self, edge: &Edge) -> RelationshipChoice {
        self.get(&edge.key()).unwrap_or_default()
    }

    /// Iterate choices in edge-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&EdgeKey, RelationshipChoice)> {
        self.choices.iter().map(|(k, c)| (k, *c))
    }

    /// Number of explicit choices.
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    /// Check if no choice has been recorded.
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

impl From<Vec<ChoiceEntry>> for ChoiceSet {
    fn from(entries: Vec<ChoiceEntry>) -> Self {
        let choices = entries
            .into_iter()
            .map(|e| (EdgeKey::new(e.child, e.parent, e.constraint), e.choice))
            .collect();
        Self { choices }
    }
}

impl From<ChoiceSet> for Vec<ChoiceEntry> {
    fn from(set: ChoiceSet) -> Self {
        set.choices
            .into_iter()
            .map(|(key, choice)| ChoiceEntry {
                child: key.child,
                parent: key.parent,
                constraint: key.constraint,
                choice,
            })
            .collect()
    }
}

/// Classify a parent/child relationship as one-to-one or one-to-many.
///
/// Approximation from row counts only: when the child has no more rows than
/// the parent the relationship is assumed to be 1:1 and embedded as a single
/// sub-document, otherwise 1:N and embedded as an array. Missing statistics
/// (a zero on either side) default to an array.
pub fn classify_relationship(child_rows: u64, parent_rows: u64) -> RelationshipChoice {
    if child_rows == 0 || parent_rows == 0 {
        return RelationshipChoice::EmbedArray;
    }

    if child_rows as f64 / parent_rows as f64 <= 1.0 {
        RelationshipChoice::EmbedSingle
    } else {
        RelationshipChoice::EmbedArray
    }
}

/// Suggest an embedding for every edge of `graph` from table statistics.
///
/// Self-references are always suggested as references.
pub fn suggest_choices(graph: &RelationshipGraph, tables: &[Table]) -> ChoiceSet {
    let rows: HashMap<&str, u64> = tables
        .iter()
        .map(|t| (t.name.as_str(), t.row_count))
        .collect();

    let mut choices = ChoiceSet::new();
    for edge in graph.edges() {
        let choice = if edge.is_self_reference() {
            RelationshipChoice::Reference
        } else {
            let child_rows = rows.get(edge.child_table.as_str()).copied().unwrap_or(0);
            let parent_rows = rows.get(edge.parent_table.as_str()).copied().unwrap_or(0);
            classify_relationship(child_rows, parent_rows)
        };
        choices.set(edge.key(), choice);
    }

    choices
}
