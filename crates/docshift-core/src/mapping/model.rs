//! Document mapping model.

use crate::error::Error;
use crate::graph::topological_sort;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Shape of an embedded relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// One sub-document per parent.
    Single,
    /// An array of sub-documents per parent.
    Array,
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipKind::Single => write!(f, "single"),
            RelationshipKind::Array => write!(f, "array"),
        }
    }
}

/// Kind of field transformation applied during data movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformationKind {
    /// Rename a field.
    Rename,
    /// Compute a field from an expression.
    Compute,
    /// Cast a field to another type.
    Cast,
    /// Drop rows not matching an expression.
    Filter,
    /// Fill a default for missing values.
    Default,
    /// Leave a field out of the document.
    Exclude,
}

/// A field transformation.
///
/// Carried through for code generation; the planner never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    /// Transformation kind.
    pub kind: TransformationKind,
    /// Field the transformation applies to.
    pub field: String,
    /// Kind-specific argument (new name, expression, target type, ...).
    #[serde(default)]
    pub argument: Option<String>,
}

impl Transformation {
    /// Create a transformation.
    pub fn new(kind: TransformationKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            argument: None,
        }
    }

    /// Set the kind-specific argument.
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }
}

/// A child table nested inside its parent's documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedded {
    /// Source table of the sub-documents.
    pub source_table: String,
    /// Field holding the sub-document(s) in the parent.
    pub field_name: String,
    /// Single sub-document or array.
    pub kind: RelationshipKind,
    /// Child column holding the parent's key.
    pub join_column: String,
    /// Parent column referenced by the join column.
    pub parent_column: String,
    /// Further tables embedded inside these sub-documents.
    #[serde(default)]
    pub embedded: Vec<Embedded>,
    /// Field transformations.
    #[serde(default)]
    pub transformations: Vec<Transformation>,
}

impl Embedded {
    /// Depth of the subtree rooted here (1 for a leaf).
    pub fn depth(&self) -> usize {
        1 + self.embedded.iter().map(Embedded::depth).max().unwrap_or(0)
    }

    fn collect_tables<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.source_table);
        for child in &self.embedded {
            child.collect_tables(out);
        }
    }

    fn collect_parents(&self, out: &mut BTreeMap<String, String>) {
        for child in &self.embedded {
            out.insert(child.source_table.clone(), self.source_table.clone());
            child.collect_parents(out);
        }
    }
}

/// A related table kept as its own collection and linked by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Referenced source table.
    pub source_table: String,
    /// Field carrying the link.
    pub field_name: String,
    /// Child column holding the parent's key.
    pub join_column: String,
    /// Parent column referenced by the join column.
    pub parent_column: String,
}

/// A target collection rooted at one source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection name.
    pub name: String,
    /// Root source table.
    pub source_table: String,
    /// Tables embedded into every document.
    #[serde(default)]
    pub embedded: Vec<Embedded>,
    /// Related tables kept as separate collections.
    #[serde(default)]
    pub references: Vec<Reference>,
    /// Field transformations.
    #[serde(default)]
    pub transformations: Vec<Transformation>,
}

impl Collection {
    /// Create an empty collection named after its source table.
    pub fn new(source_table: impl Into<String>) -> Self {
        let source_table = source_table.into();
        Self {
            name: source_table.clone(),
            source_table,
            embedded: Vec::new(),
            references: Vec::new(),
            transformations: Vec::new(),
        }
    }

    /// Add an embedded entry.
    pub fn with_embedded(mut self, embedded: Embedded) -> Self {
        self.embedded.push(embedded);
        self
    }

    /// Add a reference entry.
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    /// Deepest embedding level below the root (0 when nothing is embedded).
    pub fn depth(&self) -> usize {
        self.embedded.iter().map(Embedded::depth).max().unwrap_or(0)
    }
}

/// The planned document model: an ordered list of collections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mapping {
    /// Collections in creation order.
    pub collections: Vec<Collection>,
}

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a collection by name.
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Every source table placed as a collection root or an embedded entry.
    ///
    /// A valid mapping never lists a table twice.
    pub fn placed_tables(&self) -> Vec<&str> {
        let mut tables = Vec::new();
        for collection in &self.collections {
            tables.push(collection.source_table.as_str());
            for embedded in &collection.embedded {
                embedded.collect_tables(&mut tables);
            }
        }
        tables
    }

    /// Child -> parent map of every embedding in the mapping.
    pub fn embed_parents(&self) -> BTreeMap<String, String> {
        let mut parents = BTreeMap::new();
        for collection in &self.collections {
            for embedded in &collection.embedded {
                parents.insert(
                    embedded.source_table.clone(),
                    collection.source_table.clone(),
                );
                embedded.collect_parents(&mut parents);
            }
        }
        parents
    }

    /// Check the single-owner and acyclic-embedding invariants.
    pub fn verify(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for table in self.placed_tables() {
            if !seen.insert(table) {
                return Err(Error::InvalidMapping(format!(
                    "table '{}' is placed more than once",
                    table
                )));
            }
        }

        topological_sort(&self.embed_parents()).map_err(|e| {
            Error::InvalidMapping(format!("embedding relation is cyclic ({})", e))
        })?;

        Ok(())
    }
}
