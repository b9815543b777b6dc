//! Foreign-key relationship graph.
//!
//! The graph is a read-only view over a table set: one directed edge per
//! foreign key, pointing from the child (owning) table to the referenced
//! parent table. It answers the structural questions the denormalization
//! step needs before any embedding decision is made:
//! - which tables reference themselves
//! - which foreign-key chains loop back on themselves
//! - which tables look like many-to-many join tables
//! - how deep and in which order a set of embeddings nests

mod join_table;
mod ordering;
mod relationship;

pub use join_table::{detect_join_table, JoinSide, JoinTable};
pub use ordering::{nesting_depth, topological_sort};
pub use relationship::{Edge, EdgeKey, RelationshipGraph};
