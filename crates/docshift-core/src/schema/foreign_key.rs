//! Foreign key definitions between source tables.

use super::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A foreign key constraint owned by a child table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name (unique within the owning table).
    pub name: String,
    /// Referencing columns on the owning (child) table.
    pub columns: Vec<String>,
    /// Referenced (parent) table.
    pub referenced_table: String,
    /// Referenced columns on the parent table.
    pub referenced_columns: Vec<String>,
}

impl ForeignKey {
    /// Create a single-column foreign key.
    pub fn new(
        name: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: vec![column.into()],
            referenced_table: referenced_table.into(),
            referenced_columns: vec![referenced_column.into()],
        }
    }

    /// Create a composite foreign key.
    pub fn composite(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
        referenced_table: impl Into<String>,
        referenced_columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            referenced_table: referenced_table.into(),
            referenced_columns: referenced_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if any of this key's columns is `column`.
    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// A foreign key whose referenced table is not part of the table set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanedReference {
    /// Table owning the foreign key.
    pub table: String,
    /// Constraint name.
    pub constraint: String,
    /// Missing referenced table.
    pub referenced_table: String,
}

/// List foreign keys that point outside `tables`.
///
/// These are the edges the relationship graph drops; callers surface them so
/// an operator can widen the table selection if the link matters.
pub fn orphaned_references(tables: &[Table]) -> Vec<OrphanedReference> {
    let names: HashSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();

    tables
        .iter()
        .flat_map(|table| {
            table
                .foreign_keys
                .iter()
                .filter(|fk| !names.contains(fk.referenced_table.as_str()))
                .map(|fk| OrphanedReference {
                    table: table.name.clone(),
                    constraint: fk.name.clone(),
                    referenced_table: fk.referenced_table.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_column_foreign_key() {
        let fk = ForeignKey::new("orders_customer_fk", "customer_id", "customers", "id");

        assert_eq!(fk.columns, vec!["customer_id"]);
        assert_eq!(fk.referenced_table, "customers");
        assert!(fk.contains_column("customer_id"));
        assert!(!fk.contains_column("id"));
    }

    #[test]
    fn test_composite_foreign_key() {
        let fk = ForeignKey::composite(
            "line_fk",
            ["order_id", "line_no"],
            "order_lines",
            ["order_id", "line_no"],
        );
        assert_eq!(fk.columns.len(), 2);
        assert_eq!(fk.referenced_columns.len(), 2);
    }

    #[test]
    fn test_orphaned_references() {
        let tables = vec![
            Table::new("customers"),
            Table::new("orders")
                .with_foreign_key(ForeignKey::new("orders_customer_fk", "customer_id", "customers", "id"))
                .with_foreign_key(ForeignKey::new("orders_region_fk", "region_id", "regions", "id")),
        ];

        let orphans = orphaned_references(&tables);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].table, "orders");
        assert_eq!(orphans[0].constraint, "orders_region_fk");
        assert_eq!(orphans[0].referenced_table, "regions");
    }
}
