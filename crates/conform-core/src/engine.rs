//! Plan and apply: fetches live metadata, diffs it against the model
//! and renders the result into an executable script.

use std::fmt;

use chrono::Utc;
use tracing::{debug, info};

use crate::ddl::DdlGenerator;
use crate::diff::{diff_columns, diff_indexes};
use crate::error::Result;
use crate::model::{ModelBuilder, SchemaModel};
use crate::operations::SyncAction;
use crate::policy::SchemaConfig;
use crate::provider::{BatchExecutor, MetadataProvider, TableRef};

/// A generated migration script.
///
/// Statements are in execution order: per table, create before alter
/// before index, tables in model declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    header: String,
    statements: Vec<String>,
}

impl MigrationScript {
    fn new(statements: Vec<String>) -> Self {
        Self {
            header: format!("-- conform: generated {}", Utc::now().to_rfc3339()),
            statements,
        }
    }

    /// The generated statements, without the header.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Whether the plan contains no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Renders the script: a timestamp comment followed by one statement
    /// per line, every line newline-terminated.
    #[must_use]
    pub fn sql(&self) -> String {
        let mut out = String::with_capacity(
            self.header.len() + 1 + self.statements.iter().map(|s| s.len() + 1).sum::<usize>(),
        );
        out.push_str(&self.header);
        out.push('\n');
        for statement in &self.statements {
            out.push_str(statement);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for MigrationScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Drives a synchronization run.
///
/// The engine owns no connection; it borrows a [`MetadataProvider`] to
/// read live state and, for [`SyncEngine::sync`], a [`BatchExecutor`]
/// to apply the result.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    config: SchemaConfig,
    generator: DdlGenerator,
}

impl SyncEngine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn new(config: SchemaConfig) -> Self {
        Self {
            config,
            generator: DdlGenerator::new(),
        }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Starts a model builder seeded with this engine's configuration.
    #[must_use]
    pub fn model(&self) -> ModelBuilder {
        ModelBuilder::new(self.config.clone())
    }

    /// Computes the script that would bring the live schema up to the
    /// model. Reads metadata once per run: the table and index lists up
    /// front, then one column listing per table that already exists.
    pub async fn plan<P>(&self, model: &SchemaModel, provider: &mut P) -> Result<MigrationScript>
    where
        P: MetadataProvider,
    {
        let live_tables = provider.list_tables().await?;
        let live_indexes = provider.list_indexes().await?;
        debug!(
            tables = live_tables.len(),
            indexes = live_indexes.len(),
            "fetched live metadata"
        );

        let mut actions: Vec<SyncAction> = Vec::new();
        for table in model.tables() {
            let exists = live_tables
                .iter()
                .any(|t| t.schema == table.schema && t.name == table.name);
            if exists {
                let reference = TableRef::new(table.schema.clone(), table.name.clone());
                let live_columns = provider.list_columns(&reference).await?;
                actions.extend(diff_columns(table, &live_columns));
            } else {
                debug!(schema = %table.schema, table = %table.name, "table missing from live schema");
                actions.push(SyncAction::create_table(table.clone()));
            }
            actions.extend(diff_indexes(table, &live_indexes));
        }

        for action in &actions {
            debug!(action = %action.describe(), "planned");
        }
        info!(statements = actions.len(), "plan computed");
        let statements = actions
            .iter()
            .map(|action| self.generator.generate(action))
            .collect();
        Ok(MigrationScript::new(statements))
    }

    /// Plans and, when the plan is non-empty, hands the rendered script
    /// to the executor as a single batch.
    pub async fn sync<D>(&self, model: &SchemaModel, database: &mut D) -> Result<MigrationScript>
    where
        D: MetadataProvider + BatchExecutor,
    {
        let script = self.plan(model, database).await?;
        if script.is_empty() {
            info!("live schema already matches the model");
            return Ok(script);
        }
        database.execute_batch(&script.sql()).await?;
        info!(statements = script.statements().len(), "batch submitted");
        Ok(script)
    }
}
