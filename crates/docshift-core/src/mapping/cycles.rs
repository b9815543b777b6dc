//! Embedding cycle enforcement.

use super::{ChoiceSet, RelationshipChoice};
use crate::graph::{EdgeKey, RelationshipGraph};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Downgrade embeds until the embed-only graph is acyclic.
///
/// Builds a graph of the edges currently chosen as embeds (self-references
/// excluded) and walks forward from every child. When a walk steps back onto
/// its own path, the edge between the last two tables on the path is forced
/// to [`RelationshipChoice::Reference`] and the search restarts. Returns one
/// warning per downgraded edge.
pub fn enforce_cycle_constraints(graph: &RelationshipGraph, choices: &mut ChoiceSet) -> Vec<String> {
    let mut warnings = Vec::new();

    while let Some((key, cycle)) = find_embed_cycle(graph, choices) {
        warn!(
            child = %key.child,
            parent = %key.parent,
            constraint = %key.constraint,
            "embedding cycle detected, downgrading to reference"
        );
        warnings.push(format!(
            "embedding cycle {} broken: '{}' is referenced from '{}' instead of embedded",
            cycle.join(" -> "),
            key.child,
            key.parent
        ));
        choices.set(key, RelationshipChoice::Reference);
    }

    warnings
}

/// Child -> (parent, edge) adjacency restricted to embed edges.
type EmbedGraph<'a> = HashMap<&'a str, Vec<(&'a str, EdgeKey)>>;

fn find_embed_cycle(graph: &RelationshipGraph, choices: &ChoiceSet) -> Option<(EdgeKey, Vec<String>)> {
    let mut embeds: EmbedGraph<'_> = HashMap::new();
    let mut starts = Vec::new();

    for edge in graph.edges() {
        if edge.is_self_reference() || !choices.choice_for(edge).is_embed() {
            continue;
        }
        let child = edge.child_table.as_str();
        if !embeds.contains_key(child) {
            starts.push(child);
        }
        embeds
            .entry(child)
            .or_default()
            .push((edge.parent_table.as_str(), edge.key()));
    }

    let mut done = HashSet::new();
    for start in starts {
        if done.contains(start) {
            continue;
        }
        let mut path = vec![(start, None)];
        if let Some(found) = walk(&embeds, &mut path, &mut done) {
            return Some(found);
        }
    }

    None
}

fn walk<'a>(
    embeds: &EmbedGraph<'a>,
    path: &mut Vec<(&'a str, Option<EdgeKey>)>,
    done: &mut HashSet<&'a str>,
) -> Option<(EdgeKey, Vec<String>)> {
    let (current, _) = path.last()?.clone();

    for (next, key) in embeds.get(current).into_iter().flatten() {
        if let Some(start) = path.iter().position(|(t, _)| t == next) {
            let mut cycle: Vec<String> = path[start..].iter().map(|(t, _)| t.to_string()).collect();
            cycle.push(next.to_string());
            // Break the edge that led to the most recent table on the path.
            let breaking = path
                .last()
                .and_then(|(_, via)| via.clone())
                .unwrap_or_else(|| key.clone());
            return Some((breaking, cycle));
        }

        if done.contains(next) {
            continue;
        }

        path.push((*next, Some(key.clone())));
        if let Some(found) = walk(embeds, path, done) {
            return Some(found);
        }
        path.pop();
    }

    done.insert(current);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ForeignKey, Table};

    fn cyclic_pair() -> (RelationshipGraph, ChoiceSet) {
        let tables = vec![
            Table::new("a").with_foreign_key(ForeignKey::new("a_b", "b_id", "b", "id")),
            Table::new("b").with_foreign_key(ForeignKey::new("b_a", "a_id", "a", "id")),
        ];
        let graph = RelationshipGraph::new(&tables);
        let choices = ChoiceSet::new()
            .with(EdgeKey::new("a", "b", "a_b"), RelationshipChoice::EmbedArray)
            .with(EdgeKey::new("b", "a", "b_a"), RelationshipChoice::EmbedSingle);
        (graph, choices)
    }

    #[test]
    fn test_two_node_cycle_is_broken() {
        let (graph, mut choices) = cyclic_pair();

        let warnings = enforce_cycle_constraints(&graph, &mut choices);

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("a -> b -> a"));
        assert_eq!(
            choices.get(&EdgeKey::new("a", "b", "a_b")),
            Some(RelationshipChoice::Reference)
        );
        assert_eq!(
            choices.get(&EdgeKey::new("b", "a", "b_a")),
            Some(RelationshipChoice::EmbedSingle)
        );
        assert!(find_embed_cycle(&graph, &choices).is_none());
    }

    #[test]
    fn test_three_node_cycle_is_broken_once() {
        let tables = vec![
            Table::new("a").with_foreign_key(ForeignKey::new("a_b", "b_id", "b", "id")),
            Table::new("b").with_foreign_key(ForeignKey::new("b_c", "c_id", "c", "id")),
            Table::new("c").with_foreign_key(ForeignKey::new("c_a", "a_id", "a", "id")),
        ];
        let graph = RelationshipGraph::new(&tables);
        let mut choices = ChoiceSet::new();
        for edge in graph.edges() {
            choices.set(edge.key(), RelationshipChoice::EmbedArray);
        }

        let warnings = enforce_cycle_constraints(&graph, &mut choices);

        assert_eq!(warnings.len(), 1);
        assert_eq!(
            choices.get(&EdgeKey::new("b", "c", "b_c")),
            Some(RelationshipChoice::Reference)
        );
    }

    #[test]
    fn test_acyclic_choices_untouched() {
        let tables = vec![
            Table::new("customers"),
            Table::new("orders")
                .with_foreign_key(ForeignKey::new("o_c", "customer_id", "customers", "id")),
        ];
        let graph = RelationshipGraph::new(&tables);
        let mut choices = ChoiceSet::new().with(
            EdgeKey::new("orders", "customers", "o_c"),
            RelationshipChoice::EmbedArray,
        );
        let before = choices.clone();

        assert!(enforce_cycle_constraints(&graph, &mut choices).is_empty());
        assert_eq!(choices, before);
    }
}
