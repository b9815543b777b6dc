//! Column definitions for source tables.

use super::types::ColumnType;
use serde::{Deserialize, Serialize};

/// A column of a source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (unique within its table).
    pub name: String,
    /// Declared data type, as reported by the source database.
    pub data_type: String,
    /// Whether the column accepts NULL.
    #[serde(default)]
    pub nullable: bool,
    /// Whether the column is backed by a sequence / auto-increment.
    #[serde(default)]
    pub auto_increment: bool,
}

impl Column {
    /// Create a new non-nullable column.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: false,
            auto_increment: false,
        }
    }

    /// Create a nullable column.
    pub fn nullable(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            nullable: true,
            ..Self::new(name, data_type)
        }
    }

    /// Mark the column as auto-incrementing.
    pub fn with_auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Classify the declared data type.
    pub fn column_type(&self) -> ColumnType {
        ColumnType::parse(&self.data_type)
    }

    /// Estimated on-disk width, using `fallback` for variable-width types.
    pub fn estimated_width(&self, fallback: u64) -> u64 {
        self.column_type().fixed_width().unwrap_or(fallback)
    }
}
