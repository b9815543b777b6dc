//! Source relational schema model.
//!
//! These are the immutable inputs of every planning step: tables with their
//! columns, keys, indexes, and row/byte statistics. Schema discovery is the
//! caller's job; nothing here talks to a database.

mod column;
mod foreign_key;
mod index;
mod table;
mod types;

pub use column::Column;
pub use foreign_key::{orphaned_references, ForeignKey, OrphanedReference};
pub use index::{Index, IndexColumn, SortOrder};
pub use table::{PrimaryKey, Table};
pub use types::ColumnType;
