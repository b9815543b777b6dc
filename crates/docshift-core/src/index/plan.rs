//! Index plan types.

use crate::schema::SortOrder;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The target's native identity field, indexed implicitly.
pub const ID_FIELD: &str = "_id";

/// One key of a target index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexKey {
    /// Field path, dot-separated for embedded fields.
    pub field: String,
    /// Sort direction.
    pub order: SortOrder,
}

impl IndexKey {
    /// Create a key.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Create an ascending key.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }
}

/// A target index definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Ordered keys.
    pub keys: Vec<IndexKey>,
    /// Index name.
    pub name: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

impl IndexDefinition {
    /// Create an index named after its keys, e.g. `customer_id_1_created_at_-1`.
    pub fn new(keys: Vec<IndexKey>, unique: bool) -> Self {
        let name = keys
            .iter()
            .map(|k| format!("{}_{}", k.field, k.order))
            .collect::<Vec<_>>()
            .join("_");
        Self { keys, name, unique }
    }

    /// Override the generated name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Field paths in key order.
    pub fn fields(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.field.as_str()).collect()
    }

    /// Check if the only key is the identity field.
    pub fn is_identity_only(&self) -> bool {
        matches!(self.keys.as_slice(), [key] if key.field == ID_FIELD)
    }
}

/// An index on a specific collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionIndex {
    /// Target collection.
    pub collection: String,
    /// Index definition.
    pub index: IndexDefinition,
}

/// Indexes to create on the target, with one explanation per index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexPlan {
    /// Indexes in emission order.
    pub indexes: Vec<CollectionIndex>,
    /// Human-readable reason for each index, parallel to `indexes`.
    pub explanations: Vec<String>,
}

impl IndexPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an index unless it is redundant.
    ///
    /// An index is dropped when its only key is `_id` or when the collection
    /// already has an index with the same ordered keys. Returns whether the
    /// index was recorded.
    pub fn add(
        &mut self,
        collection: &str,
        index: IndexDefinition,
        explanation: impl Into<String>,
    ) -> bool {
        if index.keys.is_empty() || index.is_identity_only() {
            return false;
        }

        if self
            .indexes
            .iter()
            .any(|ci| ci.collection == collection && ci.index.keys == index.keys)
        {
            debug!(
                collection,
                index = %index.name,
                "skipping index with duplicate key signature"
            );
            return false;
        }

        self.indexes.push(CollectionIndex {
            collection: collection.to_string(),
            index,
        });
        self.explanations.push(explanation.into());
        true
    }

    /// Indexes planned for one collection.
    pub fn for_collection<'a>(&'a self, collection: &'a str) -> impl Iterator<Item = &'a IndexDefinition> {
        self.indexes
            .iter()
            .filter(move |ci| ci.collection == collection)
            .map(|ci| &ci.index)
    }

    /// Number of planned indexes.
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Check if no index is planned.
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
