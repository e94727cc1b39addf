//! Live-metadata access: the provider contract the engine plans against
//! and the executor contract it applies through.

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::policy::ColumnLength;

/// Identifies a base table by schema and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    /// Schema the table lives in.
    pub schema: String,
    /// Table name.
    pub name: String,
}

impl TableRef {
    /// Creates a reference from schema and table name.
    #[must_use]
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// A column as reported by the live database.
///
/// `db_type` carries the bare type name in lower case; the width lives
/// in `length` so it compares directly against the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveColumn {
    /// Column name.
    pub name: String,
    /// Bare column type name, lower case, without a width suffix.
    pub db_type: String,
    /// Stored width; `Max` when the catalog reports the unbounded
    /// sentinel, `None` when the type carries no length.
    pub length: Option<ColumnLength>,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the column is part of the primary key.
    pub key: bool,
    /// Whether the column is database-generated.
    pub identity: bool,
}

/// An index as reported by the live database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveIndex {
    /// Schema of the indexed table.
    pub schema: String,
    /// Name of the indexed table.
    pub table: String,
    /// Index name.
    pub name: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Key columns in key order.
    pub columns: Vec<String>,
}

/// Read access to the live schema of a database.
///
/// Implementations report what exists at call time and never cache
/// across calls; the engine calls each method at most once per run (and
/// `list_columns` at most once per table), so freshness is the
/// implementation's only obligation.
#[async_trait]
pub trait MetadataProvider: Send {
    /// Lists all base tables, ordered by schema then name. Views and
    /// system tables are not included.
    async fn list_tables(&mut self) -> Result<Vec<TableRef>>;

    /// Lists all indexes on user tables, ordered by schema, table and
    /// index name, with each index's columns in key order.
    async fn list_indexes(&mut self) -> Result<Vec<LiveIndex>>;

    /// Lists the columns of one table in ordinal order. An unbounded
    /// text column is reported with [`ColumnLength::Max`].
    async fn list_columns(&mut self, table: &TableRef) -> Result<Vec<LiveColumn>>;
}

/// Applies a generated script to a database in a single hand-off.
#[async_trait]
pub trait BatchExecutor: Send {
    /// Executes `sql` as one batch. Statement splitting, if any, is the
    /// implementation's concern.
    async fn execute_batch(&mut self, sql: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ref_display() {
        let t = TableRef::new("dbo", "Person");
        assert_eq!(t.to_string(), "dbo.Person");
    }
}
