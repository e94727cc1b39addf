//! Error types for schema synchronization.

use crate::policy::ValueType;

/// Errors raised while building a schema model or running a sync.
#[derive(Debug, thiserror::Error)]
pub enum ConformError {
    /// A table was declared without a key column.
    #[error("Table '{schema}.{table}' declares no key column")]
    NoKeyColumn {
        /// Schema of the offending table.
        schema: String,
        /// Name of the offending table.
        table: String,
    },

    /// A table was declared with more than one key column.
    #[error("Table '{schema}.{table}' declares {count} key columns, expected exactly one")]
    MultipleKeyColumns {
        /// Schema of the offending table.
        schema: String,
        /// Name of the offending table.
        table: String,
        /// How many key columns were declared.
        count: usize,
    },

    /// A column uses a value type the column policy has no mapping for.
    #[error("No column type mapping for {value_type} (column '{column}' on table '{table}')")]
    UnmappedType {
        /// The declared value type.
        value_type: ValueType,
        /// Name of the offending column.
        column: String,
        /// Table the column belongs to.
        table: String,
    },

    /// The metadata provider failed while reading the live schema.
    #[error("Metadata provider error: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The executor failed while applying a generated script.
    #[error("Batch execution error: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ConformError {
    /// Wraps a driver error raised while reading live metadata.
    pub fn provider<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Provider(Box::new(source))
    }

    /// Wraps a driver error raised while executing a script.
    pub fn execution<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Execution(Box::new(source))
    }
}

/// Result type for schema synchronization operations.
pub type Result<T> = std::result::Result<T, ConformError>;
