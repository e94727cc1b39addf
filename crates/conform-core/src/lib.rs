//! Declarative schema synchronization for SQL Server.
//!
//! `conform-core` compares a schema model declared in code against the
//! live schema of a running database and produces the additive DDL that
//! closes the gap. Applying the same model twice yields an empty plan;
//! nothing the engine emits can drop a table, a column or an index.
//!
//! # Architecture
//!
//! - **model**: fluent builders and the resolved tables, columns and
//!   indexes the engine works on
//! - **policy**: the closed value-type table plus nullability, length
//!   and schema defaulting rules
//! - **provider**: async contracts for reading live metadata and
//!   executing a generated batch
//! - **diff**: name-based, additive-only comparison
//! - **ddl**: whitespace-stable T-SQL rendering
//! - **engine**: orchestration, from metadata fetch to script hand-off
//!
//! # Example
//!
//! ```rust,ignore
//! use conform_core::prelude::*;
//!
//! let engine = SyncEngine::new(SchemaConfig::default());
//! let model = engine
//!     .model()
//!     .table(
//!         table("Person")
//!             .column(int32("Id").key().identity())
//!             .column(text("Name").max_length(30).required())
//!             .column(text("Email").unbounded().required()),
//!     )
//!     .build()?;
//!
//! let script = engine.plan(&model, &mut provider).await?;
//! println!("{script}");
//! ```

pub mod ddl;
pub mod diff;
pub mod engine;
pub mod error;
pub mod model;
pub mod operations;
pub mod policy;
pub mod provider;

/// Commonly used types, re-exported for glob import.
pub mod prelude {
    pub use crate::ddl::DdlGenerator;
    pub use crate::diff::{diff_columns, diff_indexes};
    pub use crate::engine::{MigrationScript, SyncEngine};
    pub use crate::error::{ConformError, Result};
    pub use crate::model::{
        boolean, column, datetime, int32, table, text, Column, ColumnBuilder, Index, ModelBuilder,
        SchemaModel, Table, TableBuilder,
    };
    pub use crate::operations::SyncAction;
    pub use crate::policy::{ColumnLength, SchemaConfig, ValueType};
    pub use crate::provider::{BatchExecutor, LiveColumn, LiveIndex, MetadataProvider, TableRef};
}
