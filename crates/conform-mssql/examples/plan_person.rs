//! Plans a small model against a live SQL Server and prints the DDL.
//!
//! Connection comes from MSSQL_HOST, MSSQL_PORT, MSSQL_DATABASE,
//! MSSQL_USER and MSSQL_PASSWORD; unset variables fall back to a local
//! container setup. Set MSSQL_ENCRYPT=true to negotiate TLS against a
//! server with a self-signed certificate.

use conform_core::prelude::*;
use conform_mssql::{MssqlConfig, MssqlDatabase};

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = MssqlConfig::new(
        env_or("MSSQL_DATABASE", "master"),
        env_or("MSSQL_USER", "sa"),
        env_or("MSSQL_PASSWORD", ""),
    )
    .host(env_or("MSSQL_HOST", "localhost"))
    .port(env_or("MSSQL_PORT", "1433").parse()?);
    let config = if env_or("MSSQL_ENCRYPT", "false") == "true" {
        config.trust_server_certificate()
    } else {
        config.without_encryption()
    };

    let engine = SyncEngine::new(SchemaConfig::default());
    let model = engine
        .model()
        .table(
            table("Person")
                .column(int32("Id").key().identity())
                .column(text("Name").max_length(30).required())
                .column(text("Email").unbounded().required()),
        )
        .build()?;

    let mut database = MssqlDatabase::connect(&config).await?;
    let script = engine.plan(&model, &mut database).await?;
    if script.is_empty() {
        println!("schema is up to date");
    } else {
        print!("{script}");
    }
    Ok(())
}
