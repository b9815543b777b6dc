//! Table definitions.

use super::{Column, ForeignKey, Index};
use serde::{Deserialize, Serialize};

/// Primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    /// Constraint name, if the source reports one.
    #[serde(default)]
    pub name: Option<String>,
    /// Key columns in declared order.
    pub columns: Vec<String>,
}

impl PrimaryKey {
    /// Create an unnamed primary key.
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the constraint name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check whether `columns` is the same column set as this key.
    pub fn same_columns<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> bool {
        let mut mine: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let mut theirs: Vec<&str> = columns.into_iter().collect();
        mine.sort_unstable();
        theirs.sort_unstable();
        mine == theirs
    }
}

/// A source relational table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name (unique within the schema).
    pub name: String,
    /// Columns in ordinal order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Primary key, if any.
    #[serde(default)]
    pub primary_key: Option<PrimaryKey>,
    /// Foreign keys owned by this table.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Secondary indexes.
    #[serde(default)]
    pub indexes: Vec<Index>,
    /// Row count reported by the source statistics.
    #[serde(default)]
    pub row_count: u64,
    /// Total data size in bytes reported by the source statistics.
    #[serde(default)]
    pub size_bytes: u64,
}

impl Table {
    /// Create an empty table definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            row_count: 0,
            size_bytes: 0,
        }
    }

    /// Add a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Add multiple columns.
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Set the primary key columns.
    pub fn with_primary_key(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.primary_key = Some(PrimaryKey::new(columns));
        self
    }

    /// Add a foreign key.
    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Add an index.
    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Set row and byte statistics.
    pub fn with_stats(mut self, row_count: u64, size_bytes: u64) -> Self {
        self.row_count = row_count;
        self.size_bytes = size_bytes;
        self
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Average row size from statistics, if both row count and size are known.
    pub fn average_row_size(&self) -> Option<f64> {
        if self.row_count == 0 || self.size_bytes == 0 {
            return None;
        }
        Some(self.size_bytes as f64 / self.row_count as f64)
    }

    /// Row size estimated from declared column types.
    ///
    /// Variable-width columns count as `variable_width` bytes each.
    pub fn estimated_row_size(&self, variable_width: u64) -> u64 {
        self.columns
            .iter()
            .map(|c| c.estimated_width(variable_width))
            .sum()
    }
}
