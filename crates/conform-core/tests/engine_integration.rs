//! End-to-end engine tests against an in-memory metadata provider.

use std::collections::HashMap;

use async_trait::async_trait;
use conform_core::prelude::*;

#[derive(Default)]
struct FakeDatabase {
    tables: Vec<TableRef>,
    indexes: Vec<LiveIndex>,
    columns: HashMap<(String, String), Vec<LiveColumn>>,
    fail_columns: bool,
    table_calls: usize,
    index_calls: usize,
    column_calls: HashMap<(String, String), usize>,
    batches: Vec<String>,
}

impl FakeDatabase {
    fn with_table(mut self, schema: &str, name: &str, columns: Vec<LiveColumn>) -> Self {
        self.tables.push(TableRef::new(schema, name));
        self.columns
            .insert((schema.to_string(), name.to_string()), columns);
        self
    }

    fn with_index(mut self, index: LiveIndex) -> Self {
        self.indexes.push(index);
        self
    }

    fn with_failing_columns(mut self) -> Self {
        self.fail_columns = true;
        self
    }
}

#[async_trait]
impl MetadataProvider for FakeDatabase {
    async fn list_tables(&mut self) -> Result<Vec<TableRef>> {
        self.table_calls += 1;
        Ok(self.tables.clone())
    }

    async fn list_indexes(&mut self) -> Result<Vec<LiveIndex>> {
        self.index_calls += 1;
        Ok(self.indexes.clone())
    }

    async fn list_columns(&mut self, table: &TableRef) -> Result<Vec<LiveColumn>> {
        let key = (table.schema.clone(), table.name.clone());
        *self.column_calls.entry(key.clone()).or_default() += 1;
        if self.fail_columns {
            return Err(ConformError::provider(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "VIEW DEFINITION permission denied",
            )));
        }
        Ok(self.columns.get(&key).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl BatchExecutor for FakeDatabase {
    async fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.batches.push(sql.to_string());
        Ok(())
    }
}

fn engine() -> SyncEngine {
    SyncEngine::new(SchemaConfig::default())
}

fn person_model(engine: &SyncEngine) -> SchemaModel {
    engine
        .model()
        .table(
            table("Person")
                .column(int32("Id").key().identity())
                .column(text("Name").max_length(30).required())
                .column(text("Email").unbounded().required()),
        )
        .build()
        .unwrap()
}

fn live_person_columns() -> Vec<LiveColumn> {
    vec![
        LiveColumn {
            name: "Id".to_string(),
            db_type: "int".to_string(),
            length: None,
            nullable: false,
            key: true,
            identity: true,
        },
        LiveColumn {
            name: "Name".to_string(),
            db_type: "varchar".to_string(),
            length: Some(ColumnLength::Limited(30)),
            nullable: false,
            key: false,
            identity: false,
        },
        LiveColumn {
            name: "Email".to_string(),
            db_type: "varchar".to_string(),
            length: Some(ColumnLength::Max),
            nullable: false,
            key: false,
            identity: false,
        },
    ]
}

const PERSON_CREATE: &str = "CREATE TABLE [dbo].[Person] ( [Id] int IDENTITY NOT NULL PRIMARY \
                             KEY, [Name] varchar(30) NOT NULL , [Email] varchar(MAX) NOT NULL  );";

#[tokio::test]
async fn test_creates_missing_table() {
    let engine = engine();
    let model = person_model(&engine);
    let mut db = FakeDatabase::default();

    let script = engine.plan(&model, &mut db).await.unwrap();
    assert_eq!(script.statements(), [PERSON_CREATE]);
}

#[tokio::test]
async fn test_adds_missing_column() {
    let engine = engine();
    let model = person_model(&engine);
    let mut live = live_person_columns();
    live.pop();
    let mut db = FakeDatabase::default().with_table("dbo", "Person", live);

    let script = engine.plan(&model, &mut db).await.unwrap();
    assert_eq!(
        script.statements(),
        ["ALTER TABLE [dbo].[Person] ADD [Email] varchar(MAX) NOT NULL ;"]
    );
}

#[tokio::test]
async fn test_modifies_drifted_column() {
    let engine = engine();
    let model = person_model(&engine);
    let mut live = live_person_columns();
    live[1].length = Some(ColumnLength::Limited(60));
    let mut db = FakeDatabase::default().with_table("dbo", "Person", live);

    let script = engine.plan(&model, &mut db).await.unwrap();
    assert_eq!(
        script.statements(),
        ["ALTER TABLE dbo.[Person] ALTER COLUMN [Name] varchar(30) NOT NULL ;"]
    );
}

#[tokio::test]
async fn test_converged_schema_plans_nothing() {
    let engine = engine();
    let model = person_model(&engine);
    let mut db = FakeDatabase::default().with_table("dbo", "Person", live_person_columns());

    let script = engine.plan(&model, &mut db).await.unwrap();
    assert!(script.is_empty());
}

#[tokio::test]
async fn test_planning_is_repeatable_without_apply() {
    let engine = engine();
    let model = person_model(&engine);
    let mut db = FakeDatabase::default();

    let first = engine.plan(&model, &mut db).await.unwrap();
    let second = engine.plan(&model, &mut db).await.unwrap();
    assert_eq!(first.statements(), second.statements());
}

#[tokio::test]
async fn test_plan_converges_after_apply() {
    let engine = engine();
    let model = person_model(&engine);
    let mut db = FakeDatabase::default();

    let script = engine.plan(&model, &mut db).await.unwrap();
    assert!(!script.is_empty());

    // Simulate the database after the batch ran.
    db = FakeDatabase::default().with_table("dbo", "Person", live_person_columns());
    let second = engine.plan(&model, &mut db).await.unwrap();
    assert!(second.is_empty());
}

#[tokio::test]
async fn test_never_emits_drops() {
    let engine = engine();
    let model = person_model(&engine);
    let mut live = live_person_columns();
    live.push(LiveColumn {
        name: "Legacy".to_string(),
        db_type: "datetime".to_string(),
        length: None,
        nullable: true,
        key: false,
        identity: false,
    });
    let mut db = FakeDatabase::default()
        .with_table("dbo", "Person", live)
        .with_table("dbo", "Orphan", vec![])
        .with_index(LiveIndex {
            schema: "dbo".to_string(),
            table: "Person".to_string(),
            name: "IX_Stale".to_string(),
            unique: false,
            columns: vec!["Legacy".to_string()],
        });

    let script = engine.plan(&model, &mut db).await.unwrap();
    assert!(script.is_empty());
    assert!(!script.sql().contains("DROP"));
}

#[tokio::test]
async fn test_index_statement_preserves_declaration_order() {
    let engine = engine();
    let model = engine
        .model()
        .table(
            table("Audit")
                .column(int32("Id").key())
                .column(text("A").required().index("IX_Audit"))
                .column(text("B").required().index("IX_Audit"))
                .column(text("C").required().index("IX_Audit")),
        )
        .build()
        .unwrap();
    let mut db = FakeDatabase::default();

    let script = engine.plan(&model, &mut db).await.unwrap();
    assert_eq!(script.statements().len(), 2);
    assert!(script.statements()[0].starts_with("CREATE TABLE [dbo].[Audit]"));
    assert_eq!(
        script.statements()[1],
        "CREATE INDEX [IX_Audit] ON [dbo].[Audit] ([A],[B],[C]);"
    );
}

#[tokio::test]
async fn test_existing_index_is_not_recreated() {
    let engine = engine();
    let model = engine
        .model()
        .table(
            table("Person")
                .column(int32("Id").key().identity())
                .column(text("Name").max_length(30).required().index("IX_Person_Name")),
        )
        .build()
        .unwrap();
    let live = vec![
        live_person_columns()[0].clone(),
        live_person_columns()[1].clone(),
    ];
    let mut db = FakeDatabase::default()
        .with_table("dbo", "Person", live)
        .with_index(LiveIndex {
            schema: "dbo".to_string(),
            table: "Person".to_string(),
            name: "IX_Person_Name".to_string(),
            unique: true,
            columns: vec!["Name".to_string(), "Id".to_string()],
        });

    let script = engine.plan(&model, &mut db).await.unwrap();
    assert!(script.is_empty());
}

#[tokio::test]
async fn test_metadata_is_read_once_per_run() {
    let engine = engine();
    let model = engine
        .model()
        .table(
            table("Person")
                .column(int32("Id").key().identity())
                .column(text("Name").max_length(30).required())
                .column(text("Email").unbounded().required()),
        )
        .table(table("Audit").column(int32("Id").key()))
        .build()
        .unwrap();
    let mut db = FakeDatabase::default().with_table("dbo", "Person", live_person_columns());

    let script = engine.plan(&model, &mut db).await.unwrap();
    assert_eq!(script.statements().len(), 1);
    assert_eq!(db.table_calls, 1);
    assert_eq!(db.index_calls, 1);
    assert_eq!(
        db.column_calls
            .get(&("dbo".to_string(), "Person".to_string())),
        Some(&1)
    );
    // Missing tables are created outright; their columns are never listed.
    assert_eq!(
        db.column_calls
            .get(&("dbo".to_string(), "Audit".to_string())),
        None
    );
}

#[tokio::test]
async fn test_sync_submits_one_batch_with_header() {
    let engine = engine();
    let model = person_model(&engine);
    let mut db = FakeDatabase::default();

    let script = engine.sync(&model, &mut db).await.unwrap();
    assert!(!script.is_empty());
    assert_eq!(db.batches.len(), 1);
    assert!(db.batches[0].starts_with("-- conform: generated "));
    assert!(db.batches[0].contains(PERSON_CREATE));
}

#[tokio::test]
async fn test_sync_skips_hand_off_when_converged() {
    let engine = engine();
    let model = person_model(&engine);
    let mut db = FakeDatabase::default().with_table("dbo", "Person", live_person_columns());

    let script = engine.sync(&model, &mut db).await.unwrap();
    assert!(script.is_empty());
    assert!(db.batches.is_empty());
}

#[tokio::test]
async fn test_provider_error_aborts_plan() {
    let engine = engine();
    let model = person_model(&engine);
    let mut db = FakeDatabase::default()
        .with_table("dbo", "Person", live_person_columns())
        .with_failing_columns();

    let err = engine.plan(&model, &mut db).await.unwrap_err();
    assert!(matches!(err, ConformError::Provider(_)));
    // The failed listing is surfaced as-is, not retried.
    assert_eq!(
        db.column_calls
            .get(&("dbo".to_string(), "Person".to_string())),
        Some(&1)
    );
}

#[tokio::test]
async fn test_provider_error_skips_executor() {
    let engine = engine();
    let model = person_model(&engine);
    let mut db = FakeDatabase::default()
        .with_table("dbo", "Person", live_person_columns())
        .with_failing_columns();

    assert!(engine.sync(&model, &mut db).await.is_err());
    assert!(db.batches.is_empty());
}

#[tokio::test]
async fn test_tables_are_planned_in_declaration_order() {
    let engine = engine();
    let model = engine
        .model()
        .table(table("Zeta").column(int32("Id").key()))
        .table(table("Alpha").column(int32("Id").key()))
        .build()
        .unwrap();
    let mut db = FakeDatabase::default();

    let script = engine.plan(&model, &mut db).await.unwrap();
    assert!(script.statements()[0].contains("[Zeta]"));
    assert!(script.statements()[1].contains("[Alpha]"));
}
