//! T-SQL rendering for planned actions.
//!
//! The output shape is stable down to whitespace: generated scripts are
//! diffed and archived by callers, so the renderer never reformats.

use tracing::warn;

use crate::model::{Column, Index, Table};
use crate::operations::SyncAction;
use crate::policy::{zero_default, ColumnLength};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementKind {
    Create,
    Alter,
}

/// Renders planned actions into SQL Server DDL statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct DdlGenerator;

impl DdlGenerator {
    /// Creates a generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders one action into one terminated statement.
    #[must_use]
    pub fn generate(&self, action: &SyncAction) -> String {
        match action {
            SyncAction::CreateTable { table } => self.create_table_sql(table),
            SyncAction::AddColumn {
                schema,
                table,
                column,
            } => self.add_column_sql(schema, table, column),
            SyncAction::ModifyColumn {
                schema,
                table,
                column,
            } => self.alter_column_sql(schema, table, column),
            SyncAction::CreateIndex { index } => self.create_index_sql(index),
        }
    }

    fn create_table_sql(&self, table: &Table) -> String {
        let definitions: Vec<String> = table
            .columns
            .iter()
            .map(|column| self.column_definition(column, StatementKind::Create))
            .collect();
        format!(
            "CREATE TABLE {}.{} ( {} );",
            quote_ident(&table.schema),
            quote_ident(&table.name),
            definitions.join(", ")
        )
    }

    fn add_column_sql(&self, schema: &str, table: &str, column: &Column) -> String {
        format!(
            "ALTER TABLE {}.{} ADD {};",
            quote_ident(schema),
            quote_ident(table),
            self.column_definition(column, StatementKind::Alter)
        )
    }

    // The schema qualifier stays unbracketed on this path; consumers
    // parse the emitted shape as-is.
    fn alter_column_sql(&self, schema: &str, table: &str, column: &Column) -> String {
        format!(
            "ALTER TABLE {}.{} ALTER COLUMN {};",
            schema,
            quote_ident(table),
            self.column_definition(column, StatementKind::Alter)
        )
    }

    fn create_index_sql(&self, index: &Index) -> String {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let columns: Vec<String> = index.columns.iter().map(|c| quote_ident(c)).collect();
        format!(
            "CREATE {}INDEX {} ON {}.{} ({});",
            unique,
            quote_ident(&index.name),
            quote_ident(&index.schema),
            quote_ident(&index.table),
            columns.join(",")
        )
    }

    fn column_definition(&self, column: &Column, kind: StatementKind) -> String {
        let identity = if column.identity { " IDENTITY" } else { "" };
        let nullness = if column.nullable { "NULL" } else { "NOT NULL" };

        let mut tail = String::new();
        if column.key {
            tail.push_str("PRIMARY KEY");
        }
        if let Some(default) = self.default_literal(column, kind) {
            if !tail.is_empty() {
                tail.push(' ');
            }
            tail.push_str("DEFAULT ");
            tail.push_str(&default);
        }

        format!(
            "{} {}{} {} {}",
            quote_ident(&column.name),
            self.type_sql(column),
            identity,
            nullness,
            tail
        )
    }

    fn type_sql(&self, column: &Column) -> String {
        match column.length {
            Some(ColumnLength::Limited(width)) => format!("{}({})", column.db_type, width),
            Some(ColumnLength::Max) => format!("{}(MAX)", column.db_type),
            None => column.db_type.clone(),
        }
    }

    fn default_literal(&self, column: &Column, kind: StatementKind) -> Option<String> {
        if let Some(explicit) = &column.default {
            return Some(explicit.clone());
        }
        if kind == StatementKind::Alter && !column.nullable {
            let synthesized = zero_default(column.value_type);
            if synthesized.is_none() {
                warn!(
                    column = %column.name,
                    db_type = %column.db_type,
                    "altering to NOT NULL without a default; set default_expr if the table holds rows"
                );
            }
            return synthesized.map(String::from);
        }
        None
    }
}

fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}
