//! Column type classification used for size estimation.

use serde::{Deserialize, Serialize};

/// Broad classification of a source column's declared data type.
///
/// Only the storage width matters to the planner, so the many vendor
/// spellings collapse into a handful of fixed-width families plus
/// `Variable` for everything whose width cannot be known up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Boolean value.
    Bool,
    /// 16-bit integer.
    Int16,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// Fixed-precision decimal.
    Decimal,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time, with or without zone.
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
    /// Strings, blobs, json, arrays, and anything unrecognized.
    Variable,
}

impl ColumnType {
    /// Classify a declared SQL type such as `varchar(255)`, `BIGINT UNSIGNED`
    /// or `timestamp with time zone`.
    pub fn parse(data_type: &str) -> Self {
        let lowered = data_type.trim().to_ascii_lowercase();
        if lowered.ends_with("[]") {
            return ColumnType::Variable;
        }

        let base = lowered.split('(').next().unwrap_or_default().trim();

        match base {
            "bool" | "boolean" | "bit" => ColumnType::Bool,
            "smallint" | "int2" | "smallserial" | "tinyint" => ColumnType::Int16,
            "int" | "integer" | "int4" | "serial" | "mediumint" => ColumnType::Int32,
            "bigint" | "int8" | "bigserial" => ColumnType::Int64,
            "real" | "float4" => ColumnType::Float32,
            "double" | "double precision" | "float8" | "float" => ColumnType::Float64,
            "numeric" | "decimal" | "money" => ColumnType::Decimal,
            "date" => ColumnType::Date,
            "uuid" | "uniqueidentifier" => ColumnType::Uuid,
            _ => Self::parse_compound(base),
        }
    }

    fn parse_compound(base: &str) -> Self {
        let first = base.split_whitespace().next().unwrap_or_default();
        match first {
            "timestamp" | "timestamptz" | "datetime" | "datetime2" => ColumnType::Timestamp,
            "time" | "timetz" => ColumnType::Time,
            "double" => ColumnType::Float64,
            "bigint" => ColumnType::Int64,
            "int" | "integer" => ColumnType::Int32,
            "smallint" | "tinyint" => ColumnType::Int16,
            _ => ColumnType::Variable,
        }
    }

    /// Storage width in bytes, or `None` for variable-width types.
    pub fn fixed_width(&self) -> Option<u64> {
        match self {
            ColumnType::Bool => Some(1),
            ColumnType::Int16 => Some(2),
            ColumnType::Int32 | ColumnType::Float32 => Some(4),
            ColumnType::Int64
            | ColumnType::Float64
            | ColumnType::Date
            | ColumnType::Time
            | ColumnType::Timestamp => Some(8),
            ColumnType::Decimal | ColumnType::Uuid => Some(16),
            ColumnType::Variable => None,
        }
    }
}
