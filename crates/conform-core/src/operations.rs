//! Planned schema actions.
//!
//! Every variant is additive. Nothing in this module can describe a
//! drop, a rename or a data change, which is what makes a generated
//! script safe to apply to a database that still holds data.

use crate::model::{Column, Index, Table};

/// A single planned schema change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Create a table that is missing from the live schema.
    CreateTable {
        /// The desired table, rendered with its full column list.
        table: Table,
    },
    /// Add a column missing from an existing table.
    AddColumn {
        /// Schema of the target table.
        schema: String,
        /// Name of the target table.
        table: String,
        /// The desired column definition.
        column: Column,
    },
    /// Re-declare a column whose live definition drifted from the model.
    ModifyColumn {
        /// Schema of the target table.
        schema: String,
        /// Name of the target table.
        table: String,
        /// The desired column definition.
        column: Column,
    },
    /// Create an index that is missing from the live schema.
    CreateIndex {
        /// The desired index.
        index: Index,
    },
}

impl SyncAction {
    /// A create-table action.
    #[must_use]
    pub fn create_table(table: Table) -> Self {
        Self::CreateTable { table }
    }

    /// An add-column action.
    #[must_use]
    pub fn add_column(schema: impl Into<String>, table: impl Into<String>, column: Column) -> Self {
        Self::AddColumn {
            schema: schema.into(),
            table: table.into(),
            column,
        }
    }

    /// A modify-column action.
    #[must_use]
    pub fn modify_column(
        schema: impl Into<String>,
        table: impl Into<String>,
        column: Column,
    ) -> Self {
        Self::ModifyColumn {
            schema: schema.into(),
            table: table.into(),
            column,
        }
    }

    /// A create-index action.
    #[must_use]
    pub fn create_index(index: Index) -> Self {
        Self::CreateIndex { index }
    }

    /// One-line description for logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::CreateTable { table } => {
                format!("create table {}.{}", table.schema, table.name)
            }
            Self::AddColumn {
                schema,
                table,
                column,
            } => format!("add column {schema}.{table}.{}", column.name),
            Self::ModifyColumn {
                schema,
                table,
                column,
            } => format!("modify column {schema}.{table}.{}", column.name),
            Self::CreateIndex { index } => {
                format!("create index {} on {}.{}", index.name, index.schema, index.table)
            }
        }
    }
}
