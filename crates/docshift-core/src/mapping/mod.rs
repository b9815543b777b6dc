//! Denormalization: from relationship choices to a document mapping.
//!
//! The caller decides, per foreign-key edge, whether the child table is
//! embedded into its parent (as an array or a single sub-document) or kept
//! as its own collection and referenced. The [`DenormalizationEngine`] turns
//! those decisions into a [`Mapping`] that always satisfies two invariants:
//! - every source table is placed at most once
//! - the embedding relation is acyclic
//!
//! Unsatisfiable decisions are never rejected; offending embeds are
//! downgraded to references and a warning is recorded.

mod choice;
mod cycles;
mod engine;
mod model;

pub use choice::{classify_relationship, suggest_choices, ChoiceEntry, ChoiceSet, RelationshipChoice};
pub use cycles::enforce_cycle_constraints;
pub use engine::{Denormalized, DenormalizationEngine};
pub use model::{
    Collection, Embedded, Mapping, Reference, RelationshipKind, Transformation,
    TransformationKind,
};
