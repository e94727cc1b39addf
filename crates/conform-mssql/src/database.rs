//! SQL Server metadata provider and batch executor over a single
//! tiberius connection.

use async_trait::async_trait;
use tiberius::Client;
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use conform_core::error::{ConformError, Result};
use conform_core::policy::ColumnLength;
use conform_core::provider::{BatchExecutor, LiveColumn, LiveIndex, MetadataProvider, TableRef};

use crate::config::MssqlConfig;

const TABLES_SQL: &str = "\
SELECT TABLE_SCHEMA, TABLE_NAME \
FROM INFORMATION_SCHEMA.TABLES \
WHERE TABLE_TYPE = 'BASE TABLE' \
ORDER BY TABLE_SCHEMA, TABLE_NAME";

const COLUMNS_SQL: &str = "\
SELECT c.COLUMN_NAME, \
       c.DATA_TYPE, \
       ISNULL(c.CHARACTER_MAXIMUM_LENGTH, 0) AS MAX_LENGTH, \
       CASE WHEN c.IS_NULLABLE = 'YES' THEN 1 ELSE 0 END AS IS_NULLABLE, \
       CASE WHEN pk.COLUMN_NAME IS NULL THEN 0 ELSE 1 END AS IS_KEY, \
       ISNULL(COLUMNPROPERTY(OBJECT_ID(c.TABLE_SCHEMA + '.' + c.TABLE_NAME), \
                             c.COLUMN_NAME, 'IsIdentity'), 0) AS IS_IDENTITY \
FROM INFORMATION_SCHEMA.COLUMNS c \
LEFT JOIN ( \
    SELECT kcu.TABLE_SCHEMA, kcu.TABLE_NAME, kcu.COLUMN_NAME \
    FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
    JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu \
        ON kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME \
        AND kcu.TABLE_SCHEMA = tc.TABLE_SCHEMA \
        AND kcu.TABLE_NAME = tc.TABLE_NAME \
    WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY' \
) pk ON pk.TABLE_SCHEMA = c.TABLE_SCHEMA \
    AND pk.TABLE_NAME = c.TABLE_NAME \
    AND pk.COLUMN_NAME = c.COLUMN_NAME \
WHERE c.TABLE_SCHEMA = @P1 AND c.TABLE_NAME = @P2 \
ORDER BY c.ORDINAL_POSITION";

const INDEXES_SQL: &str = "\
SELECT s.name, t.name, i.name, i.is_unique, c.name \
FROM sys.indexes i \
JOIN sys.tables t ON t.object_id = i.object_id \
JOIN sys.schemas s ON s.schema_id = t.schema_id \
JOIN sys.index_columns ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id \
JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id \
WHERE i.name IS NOT NULL AND t.is_ms_shipped = 0 AND ic.is_included_column = 0 \
ORDER BY s.name, t.name, i.name, ic.key_ordinal";

/// A live SQL Server connection serving both metadata reads and batch
/// execution.
pub struct MssqlDatabase {
    client: Client<Compat<TcpStream>>,
}

impl MssqlDatabase {
    /// Connects with the given settings.
    pub async fn connect(config: &MssqlConfig) -> Result<Self> {
        let tiberius_config = config.to_tiberius();
        let tcp = TcpStream::connect(tiberius_config.get_addr())
            .await
            .map_err(ConformError::provider)?;
        tcp.set_nodelay(true).map_err(ConformError::provider)?;
        let client = Client::connect(tiberius_config, tcp.compat_write())
            .await
            .map_err(ConformError::provider)?;
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "connected to SQL Server"
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl MetadataProvider for MssqlDatabase {
    async fn list_tables(&mut self) -> Result<Vec<TableRef>> {
        debug!("listing base tables");
        let rows = self
            .client
            .simple_query(TABLES_SQL)
            .await
            .map_err(ConformError::provider)?
            .into_first_result()
            .await
            .map_err(ConformError::provider)?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let schema: &str = row.get(0).ok_or_else(|| malformed("TABLE_SCHEMA"))?;
            let name: &str = row.get(1).ok_or_else(|| malformed("TABLE_NAME"))?;
            tables.push(TableRef::new(schema, name));
        }
        Ok(tables)
    }

    async fn list_indexes(&mut self) -> Result<Vec<LiveIndex>> {
        debug!("listing indexes");
        let rows = self
            .client
            .simple_query(INDEXES_SQL)
            .await
            .map_err(ConformError::provider)?
            .into_first_result()
            .await
            .map_err(ConformError::provider)?;

        let mut parsed = Vec::with_capacity(rows.len());
        for row in rows {
            let schema: &str = row.get(0).ok_or_else(|| malformed("schema name"))?;
            let table: &str = row.get(1).ok_or_else(|| malformed("table name"))?;
            let name: &str = row.get(2).ok_or_else(|| malformed("index name"))?;
            let unique: bool = row.get(3).unwrap_or(false);
            let column: &str = row.get(4).ok_or_else(|| malformed("column name"))?;
            parsed.push(IndexRow {
                schema: schema.to_string(),
                table: table.to_string(),
                name: name.to_string(),
                unique,
                column: column.to_string(),
            });
        }
        Ok(group_indexes(parsed))
    }

    async fn list_columns(&mut self, table: &TableRef) -> Result<Vec<LiveColumn>> {
        debug!(table = %table, "listing columns");
        let rows = self
            .client
            .query(COLUMNS_SQL, &[&table.schema, &table.name])
            .await
            .map_err(ConformError::provider)?
            .into_first_result()
            .await
            .map_err(ConformError::provider)?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: &str = row.get(0).ok_or_else(|| malformed("COLUMN_NAME"))?;
            let db_type: &str = row.get(1).ok_or_else(|| malformed("DATA_TYPE"))?;
            let raw_length: i32 = row.get(2).unwrap_or(0);
            let nullable: i32 = row.get(3).unwrap_or(0);
            let key: i32 = row.get(4).unwrap_or(0);
            let identity: i32 = row.get(5).unwrap_or(0);
            columns.push(LiveColumn {
                name: name.to_string(),
                db_type: db_type.to_ascii_lowercase(),
                length: column_length(raw_length),
                nullable: nullable != 0,
                key: key != 0,
                identity: identity != 0,
            });
        }
        Ok(columns)
    }
}

#[async_trait]
impl BatchExecutor for MssqlDatabase {
    async fn execute_batch(&mut self, sql: &str) -> Result<()> {
        debug!(bytes = sql.len(), "submitting DDL batch");
        self.client
            .simple_query(sql)
            .await
            .map_err(ConformError::execution)?
            .into_results()
            .await
            .map_err(ConformError::execution)?;
        Ok(())
    }
}

/// One row of `INDEXES_SQL`: a single key column of a single index.
struct IndexRow {
    schema: String,
    table: String,
    name: String,
    unique: bool,
    column: String,
}

/// Folds ordered catalog rows into one `LiveIndex` per index. Rows
/// arrive sorted by (schema, table, index, key ordinal), so each index
/// forms one consecutive run.
fn group_indexes(rows: Vec<IndexRow>) -> Vec<LiveIndex> {
    let mut indexes: Vec<LiveIndex> = Vec::new();
    for row in rows {
        match indexes.last_mut() {
            Some(last)
                if last.schema == row.schema
                    && last.table == row.table
                    && last.name == row.name =>
            {
                last.columns.push(row.column);
            }
            _ => indexes.push(LiveIndex {
                schema: row.schema,
                table: row.table,
                name: row.name,
                unique: row.unique,
                columns: vec![row.column],
            }),
        }
    }
    indexes
}

/// Normalizes `CHARACTER_MAXIMUM_LENGTH`: 0 (from NULL) means the type
/// carries no length, -1 is the catalog's varchar(MAX) sentinel.
fn column_length(raw: i32) -> Option<ColumnLength> {
    match raw {
        0 => None,
        -1 => Some(ColumnLength::Max),
        n => u32::try_from(n).ok().map(ColumnLength::Limited),
    }
}

fn malformed(what: &str) -> ConformError {
    ConformError::Provider(format!("malformed catalog row: missing {what}").into())
}
