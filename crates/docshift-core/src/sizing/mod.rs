//! Document size estimation.
//!
//! Estimates the average and worst-case serialized size of each collection's
//! documents from source row/byte statistics, and flags collections whose
//! worst case would exceed the target's per-document limit.

mod config;
mod estimator;

pub use config::{SizeEstimatorConfig, DEFAULT_MAX_DOCUMENT_BYTES};
pub use estimator::{CollectionSizeEstimate, DocumentSizeEstimator};
