//! Target index inference.
//!
//! Translates the source indexing strategy (primary keys, foreign keys used
//! as references, secondary indexes) into indexes on the target collections,
//! rewriting field names into dot-notation paths for tables that became
//! embedded sub-documents.

mod inference;
mod plan;

pub use inference::IndexInference;
pub use plan::{CollectionIndex, IndexDefinition, IndexKey, IndexPlan, ID_FIELD};
