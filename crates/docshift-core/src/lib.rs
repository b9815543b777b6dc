//! docshift core - relational to document migration planning.
//!
//! Given source tables and per-relationship embedding decisions, this crate
//! analyzes the foreign-key graph, builds a cycle-free document mapping,
//! estimates document sizes against the target's size limit, and translates
//! the source indexes into a target index plan. Everything is an in-memory,
//! deterministic transformation; loading and persisting are up to the caller.

pub mod error;
pub mod graph;
pub mod index;
pub mod mapping;
pub mod planner;
pub mod schema;
pub mod sizing;

pub use error::Error;
pub use graph::{nesting_depth, topological_sort, Edge, EdgeKey, JoinTable, RelationshipGraph};
pub use index::{CollectionIndex, IndexDefinition, IndexInference, IndexKey, IndexPlan};
pub use mapping::{
    ChoiceSet, Collection, DenormalizationEngine, Denormalized, Embedded, Mapping, Reference,
    RelationshipChoice, RelationshipKind, Transformation, TransformationKind,
};
pub use planner::{GraphAnalysis, MigrationPlan, MigrationPlanner, PlannerConfig};
pub use schema::{Column, ColumnType, ForeignKey, Index, IndexColumn, PrimaryKey, SortOrder, Table};
pub use sizing::{CollectionSizeEstimate, DocumentSizeEstimator, SizeEstimatorConfig};
