//! Nesting depth and bottom-up ordering of embeddings.
//!
//! Both functions take a child -> parent embedding map: each key is a table
//! embedded into the table named by its value.

use crate::error::Error;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Longest embedding chain in `embeds`.
///
/// Roots are parents that are not embedded anywhere themselves. A single
/// child under a root has depth 1; an empty map has depth 0. Tables that
/// only sit on a cycle have no root and do not contribute.
pub fn nesting_depth(embeds: &BTreeMap<String, String>) -> usize {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for (child, parent) in embeds {
        children.entry(parent.as_str()).or_default().push(child.as_str());
    }

    let roots: BTreeSet<&str> = embeds
        .values()
        .map(String::as_str)
        .filter(|p| !embeds.contains_key(*p))
        .collect();

    roots
        .into_iter()
        .map(|root| depth_below(root, &children))
        .max()
        .unwrap_or(0)
}

// Every node reachable from a root has exactly one parent on the way down,
// so the walk cannot enter a cycle.
fn depth_below(table: &str, children: &HashMap<&str, Vec<&str>>) -> usize {
    children
        .get(table)
        .into_iter()
        .flatten()
        .map(|child| 1 + depth_below(child, children))
        .max()
        .unwrap_or(0)
}

/// Order tables so every embedded child precedes the table it is embedded in.
///
/// Kahn's algorithm: a table's in-degree is the number of children that must
/// be finalized before it. Ties are broken by table name. When the embeds
/// contain a cycle, [`Error::EmbeddingCycle`] carries the partial order and
/// the tables left unresolved.
pub fn topological_sort(embeds: &BTreeMap<String, String>) -> Result<Vec<String>, Error> {
    let tables: BTreeSet<&str> = embeds
        .iter()
        .flat_map(|(child, parent)| [child.as_str(), parent.as_str()])
        .collect();

    let mut in_degree: HashMap<&str, usize> = tables.iter().map(|t| (*t, 0)).collect();
    for parent in embeds.values() {
        *in_degree.entry(parent.as_str()).or_default() += 1;
    }

    let mut queue: VecDeque<&str> = tables
        .iter()
        .copied()
        .filter(|t| in_degree.get(t) == Some(&0))
        .collect();
    let mut ordered = Vec::with_capacity(tables.len());

    while let Some(table) = queue.pop_front() {
        ordered.push(table.to_string());

        if let Some(parent) = embeds.get(table) {
            if let Some(degree) = in_degree.get_mut(parent.as_str()) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(parent.as_str());
                }
            }
        }
    }

    if ordered.len() < tables.len() {
        let unresolved = tables
            .iter()
            .filter(|t| !ordered.iter().any(|o| o == *t))
            .map(|t| t.to_string())
            .collect();
        return Err(Error::EmbeddingCycle {
            ordered,
            unresolved,
        });
    }

    Ok(ordered)
}
