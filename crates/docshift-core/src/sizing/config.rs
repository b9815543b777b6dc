//! Size estimator configuration.

/// Maximum size of a single target document (16 MiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 16 * 1024 * 1024;

/// Tuning knobs for [`super::DocumentSizeEstimator`].
#[derive(Debug, Clone, PartialEq)]
pub struct SizeEstimatorConfig {
    /// Documents larger than this (worst case) are flagged.
    pub max_document_bytes: u64,

    /// Encoding overhead multiplier applied to the average estimate.
    pub average_overhead: f64,

    /// Encoding overhead multiplier applied to the worst-case estimate.
    pub worst_case_overhead: f64,

    /// How many times the average children-per-parent a skewed parent holds.
    pub array_skew_factor: f64,

    /// Width assumed for variable or unknown column types when a table has
    /// no byte statistics.
    pub unknown_column_bytes: u64,
}

impl Default for SizeEstimatorConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            average_overhead: 1.3,
            worst_case_overhead: 1.5,
            array_skew_factor: 10.0,
            unknown_column_bytes: 100,
        }
    }
}

impl SizeEstimatorConfig {
    /// Set the document size limit.
    pub fn with_max_document_bytes(mut self, bytes: u64) -> Self {
        self.max_document_bytes = bytes;
        self
    }

    /// Set the average and worst-case overhead multipliers.
    pub fn with_overhead(mut self, average: f64, worst_case: f64) -> Self {
        self.average_overhead = average;
        self.worst_case_overhead = worst_case;
        self
    }

    /// Set the array skew factor.
    pub fn with_array_skew_factor(mut self, factor: f64) -> Self {
        self.array_skew_factor = factor;
        self
    }

    /// Set the fallback width for variable-width columns.
    pub fn with_unknown_column_bytes(mut self, bytes: u64) -> Self {
        self.unknown_column_bytes = bytes;
        self
    }
}
