//! SQL Server adapter for `conform-core`.
//!
//! Implements the metadata provider over `INFORMATION_SCHEMA` and the
//! `sys` catalog views, and the batch executor over the same tiberius
//! connection. One [`MssqlDatabase`] serves a whole sync run.

mod config;
mod database;

pub use config::MssqlConfig;
pub use database::MssqlDatabase;
