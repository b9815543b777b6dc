//! Breadth-first construction of the document mapping.

use super::{
    enforce_cycle_constraints, ChoiceSet, Collection, Embedded, Mapping, Reference,
    RelationshipChoice, RelationshipKind,
};
use crate::graph::{Edge, RelationshipGraph};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Output of a denormalization run.
#[derive(Debug, Clone)]
pub struct Denormalized {
    /// The cycle-free mapping.
    pub mapping: Mapping,
    /// Choices after cycle enforcement; all references when no root was found.
    pub choices: ChoiceSet,
    /// Downgrades and other adjustments made along the way.
    pub warnings: Vec<String>,
}

/// Turns relationship choices into a [`Mapping`].
///
/// Root tables are either supplied explicitly or detected: a table is a root
/// when every foreign key it owns is a self-reference. From each root the
/// engine walks referencing tables breadth-first, embedding or referencing
/// each one according to its edge's choice. A table is placed at most once;
/// a relationship whose child is already placed is kept as a reference.
///
/// With automatic detection, tables no root reached become standalone
/// collections parents-first over the embed edges, ties broken by name, so
/// their own embeds still apply and the result does not depend on the
/// order tables were supplied in.
#[derive(Debug, Clone)]
pub struct DenormalizationEngine<'a> {
    graph: &'a RelationshipGraph,
    roots: Option<Vec<String>>,
}

impl<'a> DenormalizationEngine<'a> {
    /// Create an engine with automatic root detection.
    pub fn new(graph: &'a RelationshipGraph) -> Self {
        Self { graph, roots: None }
    }

    /// Use only these tables as roots.
    ///
    /// Tables not reachable from them by embedding are left out of the
    /// mapping.
    pub fn with_roots(mut self, roots: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roots = Some(roots.into_iter().map(Into::into).collect());
        self
    }

    /// Build a mapping from `choices`.
    ///
    /// Never fails: embedding cycles are broken by downgrading an edge to a
    /// reference, and the downgrade is reported in
    /// [`Denormalized::warnings`]. The caller's choices are not modified.
    pub fn denormalize(&self, choices: &ChoiceSet) -> Denormalized {
        let mut choices = choices.clone();
        let mut warnings = enforce_cycle_constraints(self.graph, &mut choices);

        let (roots, degraded) = self.select_roots();
        if degraded {
            warn!(
                tables = roots.len(),
                "no root tables found, mapping every table as its own collection"
            );
            warnings.push(
                "no root tables found (every table owns a foreign key); \
                 each table becomes its own collection and relationships are references"
                    .to_string(),
            );
            for edge in self.graph.edges() {
                if choices.choice_for(edge).is_embed() {
                    choices.set(edge.key(), RelationshipChoice::Reference);
                }
            }
        }

        let mut builder = MappingBuilder {
            graph: self.graph,
            choices: &choices,
            used: roots.iter().cloned().collect(),
        };

        let mut mapping = Mapping::new();
        for root in &roots {
            mapping.collections.push(builder.build_collection(root));
        }

        if self.roots.is_none() {
            while let Some(table) = self.next_standalone(&builder.used, builder.choices) {
                debug!(table = %table, "unplaced table becomes a standalone collection");
                builder.used.insert(table.clone());
                mapping.collections.push(builder.build_collection(&table));
            }
        }

        info!(
            collections = mapping.collections.len(),
            warnings = warnings.len(),
            "denormalization complete"
        );

        Denormalized {
            mapping,
            choices,
            warnings,
        }
    }

    /// Next unplaced table to root, preferring tables that no unplaced table
    /// embeds.
    fn next_standalone(&self, used: &HashSet<String>, choices: &ChoiceSet) -> Option<String> {
        let pending: BTreeSet<&str> = self
            .graph
            .tables()
            .iter()
            .map(String::as_str)
            .filter(|t| !used.contains(*t))
            .collect();

        let embedded_by_pending = |table: &str| {
            self.graph.outgoing(table).any(|e| {
                !e.is_self_reference()
                    && choices.choice_for(e).is_embed()
                    && pending.contains(e.parent_table.as_str())
            })
        };

        // The embed graph is acyclic here, so some pending table is always free.
        pending
            .iter()
            .copied()
            .find(|t| !embedded_by_pending(*t))
            .or_else(|| pending.first().copied())
            .map(str::to_string)
    }

    /// Roots to start from, and whether detection degraded to every table.
    fn select_roots(&self) -> (Vec<String>, bool) {
        if let Some(explicit) = &self.roots {
            let mut seen = HashSet::new();
            let roots = explicit
                .iter()
                .filter(|r| {
                    let known = self.graph.contains_table(r);
                    if !known {
                        warn!(table = %r, "ignoring root table outside the schema");
                    }
                    known && seen.insert(r.as_str())
                })
                .cloned()
                .collect();
            return (roots, false);
        }

        let roots: Vec<String> = self
            .graph
            .tables()
            .iter()
            .filter(|t| self.graph.outgoing(t).all(Edge::is_self_reference))
            .cloned()
            .collect();

        if roots.is_empty() && !self.graph.tables().is_empty() {
            return (self.graph.tables().to_vec(), true);
        }

        (roots, false)
    }
}

struct MappingBuilder<'g> {
    graph: &'g RelationshipGraph,
    choices: &'g ChoiceSet,
    used: HashSet<String>,
}

impl MappingBuilder<'_> {
    fn build_collection(&mut self, root: &str) -> Collection {
        let graph = self.graph;
        let mut collection = Collection::new(root);
        let mut children: HashMap<String, Vec<Embedded>> = HashMap::new();
        let mut frontier = VecDeque::from([root.to_string()]);

        while let Some(table) = frontier.pop_front() {
            for edge in graph.incoming(&table) {
                if edge.is_self_reference() {
                    collection.references.push(reference(edge));
                    continue;
                }

                match self.choices.choice_for(edge).kind() {
                    Some(kind) if !self.used.contains(&edge.child_table) => {
                        self.used.insert(edge.child_table.clone());
                        children
                            .entry(table.clone())
                            .or_default()
                            .push(embedded(edge, kind));
                        frontier.push_back(edge.child_table.clone());
                    }
                    Some(_) => {
                        debug!(
                            child = %edge.child_table,
                            parent = %edge.parent_table,
                            "table already placed, keeping relationship as reference"
                        );
                        collection.references.push(reference(edge));
                    }
                    None => collection.references.push(reference(edge)),
                }
            }
        }

        collection.embedded = attach(root, &mut children);
        collection
    }
}

fn attach(table: &str, children: &mut HashMap<String, Vec<Embedded>>) -> Vec<Embedded> {
    let mut level = children.remove(table).unwrap_or_default();
    for entry in &mut level {
        entry.embedded = attach(&entry.source_table, children);
    }
    level
}

fn embedded(edge: &Edge, kind: RelationshipKind) -> Embedded {
    Embedded {
        source_table: edge.child_table.clone(),
        field_name: edge.child_table.clone(),
        kind,
        join_column: edge.join_column().to_string(),
        parent_column: edge.parent_column().to_string(),
        embedded: Vec::new(),
        transformations: Vec::new(),
    }
}

fn reference(edge: &Edge) -> Reference {
    Reference {
        source_table: edge.child_table.clone(),
        field_name: edge.child_table.clone(),
        join_column: edge.join_column().to_string(),
        parent_column: edge.parent_column().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeKey;
    use crate::mapping::RelationshipChoice;
    use crate::schema::{ForeignKey, Table};

    fn shop() -> Vec<Table> {
        vec![
            Table::new("customers"),
            Table::new("orders")
                .with_foreign_key(ForeignKey::new("o_c", "customer_id", "customers", "id")),
            Table::new("order_items")
                .with_foreign_key(ForeignKey::new("i_o", "order_id", "orders", "id"))
                .with_foreign_key(ForeignKey::new("i_p", "product_id", "products", "id")),
            Table::new("products"),
        ]
    }

    #[test]
    fn test_nested_embedding() {
        let tables = shop();
        let graph = RelationshipGraph::new(&tables);
        let choices = ChoiceSet::new()
            .with(EdgeKey::new("orders", "customers", "o_c"), RelationshipChoice::EmbedArray)
            .with(EdgeKey::new("order_items", "orders", "i_o"), RelationshipChoice::EmbedArray);

        let result = DenormalizationEngine::new(&graph).denormalize(&choices);
        let mapping = &result.mapping;

        assert!(result.warnings.is_empty());
        assert_eq!(mapping.collections.len(), 2);

        let customers = mapping.collection("customers").unwrap();
        assert_eq!(customers.embedded.len(), 1);
        assert_eq!(customers.embedded[0].source_table, "orders");
        assert_eq!(customers.embedded[0].join_column, "customer_id");
        assert_eq!(customers.embedded[0].embedded[0].source_table, "order_items");
        assert_eq!(customers.depth(), 2);

        let products = mapping.collection("products").unwrap();
        assert!(products.embedded.is_empty());
        assert_eq!(products.references.len(), 1);
        assert_eq!(products.references[0].source_table, "order_items");
        assert!(mapping.verify().is_ok());
    }

    #[test]
    fn test_child_embedded_once() {
        let tables = shop();
        let graph = RelationshipGraph::new(&tables);
        let mut choices = ChoiceSet::new();
        for edge in graph.edges() {
            choices.set(edge.key(), RelationshipChoice::EmbedArray);
        }

        let result = DenormalizationEngine::new(&graph).denormalize(&choices);

        assert!(result.mapping.verify().is_ok());
        let placed = result.mapping.placed_tables();
        assert_eq!(placed.iter().filter(|t| **t == "order_items").count(), 1);
        let products = result.mapping.collection("products").unwrap();
        assert!(products.embedded.is_empty());
        assert_eq!(products.references[0].source_table, "order_items");
    }

    #[test]
    fn test_reference_stops_descent() {
        let tables = shop();
        let graph = RelationshipGraph::new(&tables);
        let choices = ChoiceSet::new()
            .with(EdgeKey::new("order_items", "orders", "i_o"), RelationshipChoice::EmbedArray);

        let result = DenormalizationEngine::new(&graph).denormalize(&choices);
        let mapping = &result.mapping;

        let customers = mapping.collection("customers").unwrap();
        assert!(customers.embedded.is_empty());
        assert_eq!(customers.references[0].source_table, "orders");

        let orders = mapping.collection("orders").unwrap();
        assert_eq!(orders.embedded[0].source_table, "order_items");
        assert!(mapping.verify().is_ok());
    }

    #[test]
    fn test_self_reference_is_never_embedded() {
        let tables = vec![Table::new("employees")
            .with_foreign_key(ForeignKey::new("e_m", "manager_id", "employees", "id"))];
        let graph = RelationshipGraph::new(&tables);
        let choices = ChoiceSet::new().with(
            EdgeKey::new("employees", "employees", "e_m"),
            RelationshipChoice::EmbedArray,
        );

        let result = DenormalizationEngine::new(&graph).denormalize(&choices);

        assert_eq!(result.mapping.collections.len(), 1);
        let employees = &result.mapping.collections[0];
        assert!(employees.embedded.is_empty());
        assert_eq!(employees.references[0].join_column, "manager_id");
    }

    #[test]
    fn test_explicit_roots_leave_out_unplaced() {
        let tables = shop();
        let graph = RelationshipGraph::new(&tables);
        let choices = ChoiceSet::new()
            .with(EdgeKey::new("orders", "customers", "o_c"), RelationshipChoice::EmbedArray);

        let result = DenormalizationEngine::new(&graph)
            .with_roots(["customers"])
            .denormalize(&choices);

        assert_eq!(result.mapping.collections.len(), 1);
        assert_eq!(
            result.mapping.placed_tables(),
            vec!["customers", "orders"]
        );
    }

    #[test]
    fn test_fully_cyclic_schema_degrades() {
        let tables = vec![
            Table::new("a").with_foreign_key(ForeignKey::new("a_b", "b_id", "b", "id")),
            Table::new("b").with_foreign_key(ForeignKey::new("b_a", "a_id", "a", "id")),
        ];
        let graph = RelationshipGraph::new(&tables);
        let choices = ChoiceSet::new()
            .with(EdgeKey::new("a", "b", "a_b"), RelationshipChoice::EmbedArray)
            .with(EdgeKey::new("b", "a", "b_a"), RelationshipChoice::EmbedArray);

        let result = DenormalizationEngine::new(&graph).denormalize(&choices);

        assert_eq!(result.mapping.collections.len(), 2);
        assert!(result.mapping.collections.iter().all(|c| c.embedded.is_empty()));
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(
            choices.get(&EdgeKey::new("a", "b", "a_b")),
            Some(RelationshipChoice::EmbedArray)
        );
        assert!(result.choices.iter().all(|(_, choice)| !choice.is_embed()));
    }

    fn chain(order: &[&str]) -> Denormalized {
        let tables: Vec<Table> = order
            .iter()
            .map(|name| match *name {
                "x" => Table::new("x").with_foreign_key(ForeignKey::new("x_y", "y_id", "y", "id")),
                "y" => Table::new("y").with_foreign_key(ForeignKey::new("y_z", "z_id", "z", "id")),
                other => Table::new(other),
            })
            .collect();
        let graph = RelationshipGraph::new(&tables);
        let choices =
            ChoiceSet::new().with(EdgeKey::new("x", "y", "x_y"), RelationshipChoice::EmbedArray);
        DenormalizationEngine::new(&graph).denormalize(&choices)
    }

    #[test]
    fn test_standalone_collection_keeps_its_embeds() {
        let result = chain(&["x", "y", "z"]);
        let mapping = &result.mapping;

        let names: Vec<&str> = mapping.collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["z", "y"]);
        let y = mapping.collection("y").unwrap();
        assert_eq!(y.embedded[0].source_table, "x");
        assert!(mapping.collection("x").is_none());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_mapping_independent_of_table_order() {
        let forward = chain(&["x", "y", "z"]);
        let reverse = chain(&["z", "y", "x"]);
        let shuffled = chain(&["y", "x", "z"]);

        assert_eq!(forward.mapping, reverse.mapping);
        assert_eq!(forward.mapping, shuffled.mapping);
        assert_eq!(forward.choices, reverse.choices);
    }
}
