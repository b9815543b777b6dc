//! Edge list and adjacency indices.

use crate::schema::Table;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Stable identity of a foreign-key edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    /// Child (referencing) table.
    pub child: String,
    /// Parent (referenced) table.
    pub parent: String,
    /// Foreign key constraint name.
    pub constraint: String,
}

impl EdgeKey {
    /// Create an edge key.
    pub fn new(
        child: impl Into<String>,
        parent: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self {
            child: child.into(),
            parent: parent.into(),
            constraint: constraint.into(),
        }
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{} -> {}", self.child, self.constraint, self.parent)
    }
}

/// A foreign-key edge from a child table to the table it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Child (referencing) table.
    pub child_table: String,
    /// Referencing columns on the child.
    pub child_columns: Vec<String>,
    /// Parent (referenced) table.
    pub parent_table: String,
    /// Referenced columns on the parent.
    pub parent_columns: Vec<String>,
    /// Foreign key constraint name.
    pub constraint: String,
}

impl Edge {
    /// Identity of this edge.
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(&self.child_table, &self.parent_table, &self.constraint)
    }

    /// Check if the child and parent are the same table.
    pub fn is_self_reference(&self) -> bool {
        self.child_table == self.parent_table
    }

    /// Leading referencing column on the child.
    pub fn join_column(&self) -> &str {
        self.child_columns.first().map(String::as_str).unwrap_or_default()
    }

    /// Leading referenced column on the parent.
    pub fn parent_column(&self) -> &str {
        self.parent_columns.first().map(String::as_str).unwrap_or_default()
    }
}

/// Foreign-key graph over a set of tables.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    /// Table names in input order.
    tables: Vec<String>,
    /// All edges, in table then foreign-key order.
    edges: Vec<Edge>,
    /// Parent table -> indices of edges referencing it.
    incoming: HashMap<String, Vec<usize>>,
    /// Child table -> indices of edges it owns.
    outgoing: HashMap<String, Vec<usize>>,
}

impl RelationshipGraph {
    /// Build the graph from a table set.
    ///
    /// Foreign keys whose referenced table is not in the set are dropped;
    /// see [`crate::schema::orphaned_references`] to report them.
    pub fn new(tables: &[Table]) -> Self {
        let names: HashSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        let mut graph = Self {
            tables: tables.iter().map(|t| t.name.clone()).collect(),
            ..Default::default()
        };

        for table in tables {
            for fk in &table.foreign_keys {
                if !names.contains(fk.referenced_table.as_str()) {
                    debug!(
                        table = %table.name,
                        constraint = %fk.name,
                        referenced_table = %fk.referenced_table,
                        "dropping foreign key to table outside selection"
                    );
                    continue;
                }

                let idx = graph.edges.len();
                graph.edges.push(Edge {
                    child_table: table.name.clone(),
                    child_columns: fk.columns.clone(),
                    parent_table: fk.referenced_table.clone(),
                    parent_columns: fk.referenced_columns.clone(),
                    constraint: fk.name.clone(),
                });
                graph
                    .incoming
                    .entry(fk.referenced_table.clone())
                    .or_default()
                    .push(idx);
                graph
                    .outgoing
                    .entry(table.name.clone())
                    .or_default()
                    .push(idx);
            }
        }

        graph
    }

    /// Table names in input order.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Check whether `table` is part of the graph.
    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t == table)
    }

    /// All edges, in table then foreign-key order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up an edge by its key.
    pub fn edge(&self, key: &EdgeKey) -> Option<&Edge> {
        self.outgoing
            .get(&key.child)?
            .iter()
            .map(|&i| &self.edges[i])
            .find(|e| e.parent_table == key.parent && e.constraint == key.constraint)
    }

    /// Edges referencing `table` (the table is the parent).
    pub fn incoming(&self, table: &str) -> impl Iterator<Item = &Edge> {
        self.edge_indices(&self.incoming, table)
    }

    /// Edges owned by `table` (the table is the child).
    pub fn outgoing(&self, table: &str) -> impl Iterator<Item = &Edge> {
        self.edge_indices(&self.outgoing, table)
    }

    fn edge_indices<'a>(
        &'a self,
        index: &'a HashMap<String, Vec<usize>>,
        table: &str,
    ) -> impl Iterator<Item = &'a Edge> {
        index
            .get(table)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Every edge whose child and parent are the same table.
    pub fn self_references(&self) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.is_self_reference()).collect()
    }

    /// Find foreign-key cycles, ignoring self-references.
    ///
    /// Depth-first search from every not-yet-visited table, tracking the
    /// current path. Each time an edge leads back onto the path, the path
    /// slice from that table to the current one is reported as a cycle.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut visited = HashSet::new();
        let mut on_path = HashSet::new();
        let mut path = Vec::new();
        let mut cycles = Vec::new();

        for table in &self.tables {
            if !visited.contains(table.as_str()) {
                self.visit(table, &mut visited, &mut on_path, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn visit<'a>(
        &'a self,
        table: &'a str,
        visited: &mut HashSet<&'a str>,
        on_path: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(table);
        on_path.insert(table);
        path.push(table);

        let mut seen = HashSet::new();
        for edge in self.outgoing(table).filter(|e| !e.is_self_reference()) {
            let next = edge.parent_table.as_str();
            if !seen.insert(next) {
                continue;
            }

            if on_path.contains(next) {
                if let Some(start) = path.iter().position(|t| *t == next) {
                    cycles.push(path[start..].iter().map(|t| t.to_string()).collect());
                }
            } else if !visited.contains(next) {
                self.visit(next, visited, on_path, path, cycles);
            }
        }

        path.pop();
        on_path.remove(table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ForeignKey;

    fn table_with_fk(name: &str, fks: &[(&str, &str)]) -> Table {
        fks.iter().fold(Table::new(name), |table, (column, parent)| {
            table.with_foreign_key(ForeignKey::new(
                format!("{name}_{column}_fkey"),
                *column,
                *parent,
                "id",
            ))
        })
    }

    #[test]
    fn test_graph_construction() {
        let tables = vec![
            Table::new("customers"),
            table_with_fk("orders", &[("customer_id", "customers"), ("region_id", "regions")]),
        ];
        let graph = RelationshipGraph::new(&tables);

        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.incoming("customers").count(), 1);
        assert_eq!(graph.outgoing("orders").count(), 1);
        assert_eq!(graph.incoming("orders").count(), 0);

        let key = EdgeKey::new("orders", "customers", "orders_customer_id_fkey");
        assert!(graph.edge(&key).is_some());
        assert_eq!(graph.edge(&key).map(|e| e.join_column()), Some("customer_id"));
    }

    #[test]
    fn test_self_references() {
        let tables = vec![table_with_fk("employees", &[("manager_id", "employees")])];
        let graph = RelationshipGraph::new(&tables);

        let selfs = graph.self_references();
        assert_eq!(selfs.len(), 1);
        assert_eq!(selfs[0].child_table, "employees");
        assert!(graph.detect_cycles().is_empty());
    }

    #[test]
    fn test_detect_three_node_cycle() {
        let tables = vec![
            table_with_fk("a", &[("b_id", "b")]),
            table_with_fk("b", &[("c_id", "c")]),
            table_with_fk("c", &[("a_id", "a")]),
        ];
        let graph = RelationshipGraph::new(&tables);

        let cycles = graph.detect_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["a", "b", "c"]);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let tables = vec![
            Table::new("customers"),
            table_with_fk("orders", &[("customer_id", "customers")]),
            table_with_fk("order_items", &[("order_id", "orders")]),
        ];
        let graph = RelationshipGraph::new(&tables);
        assert!(graph.detect_cycles().is_empty());
    }

    #[test]
    fn test_edge_key_display() {
        let key = EdgeKey::new("orders", "customers", "fk_customer");
        assert_eq!(key.to_string(), "orders.fk_customer -> customers");
    }
}
