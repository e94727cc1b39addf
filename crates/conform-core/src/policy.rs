//! Column policy: the value-type table and the defaulting rules applied
//! while a model is built.
//!
//! The policy is deliberately closed: a value type either has a mapping
//! here or model construction fails. Nothing is ever guessed per column.

use std::fmt;

/// Semantic type of a declared column, independent of any SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Variable-length text.
    Text,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// Boolean flag.
    Bool,
    /// Date and time of day.
    DateTime,
    /// Universally unique identifier.
    Uuid,
    /// Raw byte payload.
    Bytes,
}

impl ValueType {
    /// Whether this is the text type. Text columns carry a length and
    /// default to nullable.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Float64 => "f64",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
            Self::Uuid => "uuid",
            Self::Bytes => "bytes",
        })
    }
}

/// Stored width of a text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLength {
    /// Fixed upper bound in characters.
    Limited(u32),
    /// Unbounded, rendered with the MAX width marker.
    Max,
}

/// Naming and sizing defaults applied while the model is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    /// Schema used by tables that do not override it.
    pub default_schema: String,
    /// Column type text columns map to.
    pub default_string_type: String,
    /// Width given to text columns with no explicit length.
    pub default_string_length: u32,
}

impl SchemaConfig {
    /// Creates the default configuration: `dbo`, `varchar`, width 255.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            default_schema: "dbo".to_string(),
            default_string_type: "varchar".to_string(),
            default_string_length: 255,
        }
    }
}

/// Maps a value type to its column type name.
///
/// Returns `None` for value types the policy does not cover; model
/// construction turns that into a hard error instead of guessing.
#[must_use]
pub fn db_type_for(value_type: ValueType, config: &SchemaConfig) -> Option<String> {
    match value_type {
        ValueType::Text => Some(config.default_string_type.clone()),
        ValueType::Int32 => Some("int".to_string()),
        ValueType::Bool => Some("bit".to_string()),
        ValueType::DateTime => Some("datetime".to_string()),
        ValueType::Int64 | ValueType::Float64 | ValueType::Uuid | ValueType::Bytes => None,
    }
}

/// Baseline nullability before explicit constraints apply: text and
/// optional declarations start out nullable, everything else NOT NULL.
#[must_use]
pub fn default_nullability(value_type: ValueType, optional: bool) -> bool {
    optional || value_type.is_text()
}

/// Resolves the stored length. Only text columns carry one; an unset
/// text length falls back to the configured default width.
#[must_use]
pub fn resolve_length(
    value_type: ValueType,
    declared: Option<ColumnLength>,
    config: &SchemaConfig,
) -> Option<ColumnLength> {
    if !value_type.is_text() {
        return None;
    }
    declared.or(Some(ColumnLength::Limited(config.default_string_length)))
}

/// Zero literal synthesized for ALTER statements that add or re-declare
/// a non-nullable column without an explicit default. Only integer and
/// boolean columns have one; other types get no synthesized default.
#[must_use]
pub fn zero_default(value_type: ValueType) -> Option<&'static str> {
    match value_type {
        ValueType::Int32 | ValueType::Bool => Some("0"),
        _ => None,
    }
}
