//! Inference of target indexes from the source schema and a mapping.

use super::{IndexDefinition, IndexKey, IndexPlan, ID_FIELD};
use crate::mapping::{Collection, Embedded, Mapping};
use crate::schema::{Index, Table};
use std::collections::HashMap;
use tracing::{debug, info};

/// Derives an [`IndexPlan`] for a mapping.
///
/// For each collection, in order:
/// 1. the root table's primary key becomes a unique index, unless it is a
///    single `id`/`_id` column already covered by the identity field
/// 2. every reference field gets a single-field index
/// 3. every source index of the root table is carried over, except the one
///    duplicating the primary key
/// 4. every embedded table, at any depth, contributes an index on its join
///    column and a copy of each of its source indexes, with fields prefixed
///    by the dot-notation path of the embedding
pub struct IndexInference<'a> {
    tables: HashMap<&'a str, &'a Table>,
}

impl<'a> IndexInference<'a> {
    /// Create an inference engine over the source tables.
    pub fn new(tables: &'a [Table]) -> Self {
        Self {
            tables: tables.iter().map(|t| (t.name.as_str(), t)).collect(),
        }
    }

    /// Infer the index plan for `mapping`.
    pub fn infer(&self, mapping: &Mapping) -> IndexPlan {
        let mut plan = IndexPlan::new();
        for collection in &mapping.collections {
            self.infer_collection(collection, &mut plan);
        }

        info!(
            collections = mapping.collections.len(),
            indexes = plan.len(),
            "index inference complete"
        );
        plan
    }

    fn infer_collection(&self, collection: &Collection, plan: &mut IndexPlan) {
        let name = collection.name.as_str();
        let root = self.tables.get(collection.source_table.as_str()).copied();
        if root.is_none() {
            debug!(
                collection = name,
                table = %collection.source_table,
                "root table missing, skipping its primary key and indexes"
            );
        }

        if let Some(table) = root {
            self.primary_key_index(name, table, plan);
        }

        for reference in &collection.references {
            plan.add(
                name,
                IndexDefinition::new(vec![IndexKey::asc(&reference.field_name)], false),
                format!(
                    "{}: index on '{}' to follow the reference to {}",
                    name, reference.field_name, reference.source_table
                ),
            );
        }

        if let Some(table) = root {
            for index in &table.indexes {
                if duplicates_primary_key(table, index) {
                    continue;
                }
                plan.add(
                    name,
                    translate(index, None),
                    format!(
                        "{}: index on ({}) carried over from source index {}",
                        name,
                        index.column_names().collect::<Vec<_>>().join(", "),
                        index.name
                    ),
                );
            }
        }

        for embedded in &collection.embedded {
            self.embedded_indexes(name, embedded, "", plan);
        }
    }

    fn primary_key_index(&self, collection: &str, table: &Table, plan: &mut IndexPlan) {
        let Some(pk) = &table.primary_key else {
            return;
        };

        if let [column] = pk.columns.as_slice() {
            if column == ID_FIELD || column == "id" {
                return;
            }
        }

        let keys = pk.columns.iter().map(IndexKey::asc).collect();
        let mut index = IndexDefinition::new(keys, true);
        if let Some(name) = &pk.name {
            index = index.with_name(name);
        }

        plan.add(
            collection,
            index,
            format!(
                "{}: unique index on ({}) preserving the source primary key",
                collection,
                pk.columns.join(", ")
            ),
        );
    }

    fn embedded_indexes(
        &self,
        collection: &str,
        embedded: &Embedded,
        prefix: &str,
        plan: &mut IndexPlan,
    ) {
        let path = if prefix.is_empty() {
            embedded.field_name.clone()
        } else {
            format!("{}.{}", prefix, embedded.field_name)
        };

        let join_path = format!("{}.{}", path, embedded.join_column);
        plan.add(
            collection,
            IndexDefinition::new(vec![IndexKey::asc(&join_path)], false),
            format!(
                "{}: index on '{}' for lookups into embedded {}",
                collection, join_path, embedded.source_table
            ),
        );

        match self.tables.get(embedded.source_table.as_str()) {
            Some(table) => {
                for index in &table.indexes {
                    plan.add(
                        collection,
                        translate(index, Some(&path)),
                        format!(
                            "{}: index on {} carried over from source index {} of embedded {}",
                            collection,
                            path,
                            index.name,
                            embedded.source_table
                        ),
                    );
                }
            }
            None => debug!(
                collection,
                table = %embedded.source_table,
                "embedded table missing, skipping its indexes"
            ),
        }

        for nested in &embedded.embedded {
            self.embedded_indexes(collection, nested, &path, plan);
        }
    }
}

/// Check whether a source index covers exactly the primary key columns.
fn duplicates_primary_key(table: &Table, index: &Index) -> bool {
    table
        .primary_key
        .as_ref()
        .is_some_and(|pk| pk.same_columns(index.column_names()))
}

/// Copy a source index, prefixing every column with `path` when embedded.
fn translate(index: &Index, path: Option<&str>) -> IndexDefinition {
    let keys = index
        .columns
        .iter()
        .map(|c| {
            let field = match path {
                Some(path) => format!("{}.{}", path, c.name),
                None => c.name.clone(),
            };
            IndexKey::new(field, c.order)
        })
        .collect();
    IndexDefinition::new(keys, index.unique)
}
