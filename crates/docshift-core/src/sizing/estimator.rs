//! Recursive document size estimator.

use super::SizeEstimatorConfig;
use crate::mapping::{Collection, Embedded, Mapping, RelationshipKind};
use crate::schema::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

const MIB: f64 = 1024.0 * 1024.0;

/// Estimated document size for one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSizeEstimate {
    /// Collection name.
    pub collection: String,
    /// Average document size in bytes, including encoding overhead.
    pub avg_document_bytes: f64,
    /// Worst-case document size in bytes, including encoding overhead.
    pub max_document_bytes: f64,
    /// Expected number of documents (root table row count).
    pub avg_row_count: u64,
    /// Whether the worst case exceeds the document size limit.
    pub exceeds_limit: bool,
    /// Operator-facing explanation when the limit is exceeded.
    pub warning: Option<String>,
}

impl CollectionSizeEstimate {
    fn empty(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            avg_document_bytes: 0.0,
            max_document_bytes: 0.0,
            avg_row_count: 0,
            exceeds_limit: false,
            warning: None,
        }
    }
}

/// Estimates document sizes for a mapping from source table statistics.
pub struct DocumentSizeEstimator<'a> {
    tables: HashMap<&'a str, &'a Table>,
    config: SizeEstimatorConfig,
}

impl<'a> DocumentSizeEstimator<'a> {
    /// Create an estimator over the source tables.
    pub fn new(tables: &'a [Table], config: SizeEstimatorConfig) -> Self {
        Self {
            tables: tables.iter().map(|t| (t.name.as_str(), t)).collect(),
            config,
        }
    }

    /// Estimate every collection of `mapping`, in mapping order.
    pub fn estimate(&self, mapping: &Mapping) -> Vec<CollectionSizeEstimate> {
        mapping
            .collections
            .iter()
            .map(|c| self.estimate_collection(c))
            .collect()
    }

    /// Estimate one collection.
    ///
    /// A collection whose root table is unknown gets a zero estimate.
    pub fn estimate_collection(&self, collection: &Collection) -> CollectionSizeEstimate {
        let Some(root) = self.tables.get(collection.source_table.as_str()) else {
            debug!(
                collection = %collection.name,
                table = %collection.source_table,
                "no statistics for root table"
            );
            return CollectionSizeEstimate::empty(&collection.name);
        };

        let base = self.base_row_size(root);
        let (nested_avg, nested_max) = self.nested_size(&collection.embedded, root.row_count);

        let avg = (base + nested_avg) * self.config.average_overhead;
        let max = (base + nested_max) * self.config.worst_case_overhead;
        let exceeds_limit = max > self.config.max_document_bytes as f64;

        let warning = exceeds_limit.then(|| {
            warn!(
                collection = %collection.name,
                max_document_bytes = max,
                "worst-case document exceeds size limit"
            );
            format!(
                "collection '{}' may produce documents of {:.1} MiB, above the {:.1} MiB limit; \
                 consider referencing its largest embedded arrays instead",
                collection.name,
                max / MIB,
                self.config.max_document_bytes as f64 / MIB
            )
        });

        CollectionSizeEstimate {
            collection: collection.name.clone(),
            avg_document_bytes: avg,
            max_document_bytes: max,
            avg_row_count: root.row_count,
            exceeds_limit,
            warning,
        }
    }

    /// Per-row size of `table` before embedding.
    ///
    /// Uses `size_bytes / row_count` when statistics exist, otherwise sums
    /// fixed column widths.
    pub fn base_row_size(&self, table: &Table) -> f64 {
        table
            .average_row_size()
            .unwrap_or_else(|| table.estimated_row_size(self.config.unknown_column_bytes) as f64)
    }

    /// Total (average, worst-case) bytes added by `entries` to one parent row.
    fn nested_size(&self, entries: &[Embedded], parent_rows: u64) -> (f64, f64) {
        entries
            .iter()
            .map(|e| self.embedded_size(e, parent_rows))
            .fold((0.0, 0.0), |(avg, max), (a, m)| (avg + a, max + m))
    }

    fn embedded_size(&self, entry: &Embedded, parent_rows: u64) -> (f64, f64) {
        let Some(child) = self.tables.get(entry.source_table.as_str()) else {
            debug!(table = %entry.source_table, "no statistics for embedded table");
            return (0.0, 0.0);
        };

        let base = self.base_row_size(child);
        let (nested_avg, nested_max) = self.nested_size(&entry.embedded, child.row_count);
        let doc_avg = base + nested_avg;
        let doc_max = base + nested_max;

        match entry.kind {
            RelationshipKind::Single => (doc_avg, doc_max),
            RelationshipKind::Array => {
                let per_parent = children_per_parent(child.row_count, parent_rows);
                (
                    per_parent * doc_avg,
                    per_parent * self.config.array_skew_factor * doc_max,
                )
            }
        }
    }
}

/// Average number of child rows per parent row, never below one.
fn children_per_parent(child_rows: u64, parent_rows: u64) -> f64 {
    let ratio = if parent_rows == 0 {
        child_rows as f64
    } else {
        child_rows as f64 / parent_rows as f64
    };
    ratio.max(1.0)
}
