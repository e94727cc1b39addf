//! Schema model: fluent declaration builders and the resolved entities
//! the diff engine works on.
//!
//! Declarations are cheap descriptions; all policy decisions (type
//! mapping, nullability, lengths, schema defaults) happen once, in
//! [`ModelBuilder::build`], which is also where invalid models are
//! rejected.

use crate::error::{ConformError, Result};
use crate::policy::{self, ColumnLength, SchemaConfig, ValueType};

/// A fully resolved column: every field is final, nothing is implied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name as declared.
    pub name: String,
    /// Semantic type the column was declared with.
    pub value_type: ValueType,
    /// Column type name after policy mapping, e.g. `int` or `varchar`.
    pub db_type: String,
    /// Stored width, present only on text columns.
    pub length: Option<ColumnLength>,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether this is the table's key column.
    pub key: bool,
    /// Whether the database generates values for this column.
    pub identity: bool,
    /// Explicit default literal, rendered verbatim after DEFAULT.
    pub default: Option<String>,
}

/// A named index over one or more columns of a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Schema of the indexed table.
    pub schema: String,
    /// Name of the indexed table.
    pub table: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Key columns in declaration order.
    pub columns: Vec<String>,
}

/// A resolved table with its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Schema the table lives in.
    pub schema: String,
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Indexes declared over this table's columns.
    pub indexes: Vec<Index>,
}

impl Table {
    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The table's key column. Always present on a built model.
    #[must_use]
    pub fn key_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.key)
    }
}

/// A validated set of tables, produced by [`ModelBuilder::build`].
///
/// Construction is the only validation point, so a model in hand is
/// known to satisfy the single-key rule and carry only mapped types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaModel {
    tables: Vec<Table>,
}

impl SchemaModel {
    /// Tables in declaration order.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Looks up a table by schema and name.
    #[must_use]
    pub fn get_table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.schema == schema && t.name == name)
    }

    /// Names of all tables, in declaration order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }
}

#[derive(Debug, Clone)]
struct IndexMembership {
    name: String,
    unique: bool,
}

/// Declares a single column. Resolved against the column policy when the
/// model is built.
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    name: String,
    value_type: ValueType,
    optional: bool,
    required: bool,
    key: bool,
    identity: bool,
    length: Option<ColumnLength>,
    default: Option<String>,
    indexes: Vec<IndexMembership>,
}

impl ColumnBuilder {
    fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            optional: false,
            required: false,
            key: false,
            identity: false,
            length: None,
            default: None,
            indexes: Vec::new(),
        }
    }

    /// Marks this column as the table's key. Key columns are NOT NULL.
    #[must_use]
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    /// Marks the column as database-generated.
    #[must_use]
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Forces NOT NULL regardless of the type's default nullability.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declares the optional form of the value type, which is nullable.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Sets an explicit maximum length. Meaningful on text columns only.
    #[must_use]
    pub fn max_length(mut self, length: u32) -> Self {
        self.length = Some(ColumnLength::Limited(length));
        self
    }

    /// Declares an unbounded text column, rendered with the MAX width.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.length = Some(ColumnLength::Max);
        self
    }

    /// Sets the default literal, rendered verbatim after DEFAULT.
    #[must_use]
    pub fn default_expr(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Adds this column to a non-unique index. The first column naming an
    /// index fixes its uniqueness; later columns append in declaration
    /// order.
    #[must_use]
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.indexes.push(IndexMembership {
            name: name.into(),
            unique: false,
        });
        self
    }

    /// Adds this column to a unique index.
    #[must_use]
    pub fn unique_index(mut self, name: impl Into<String>) -> Self {
        self.indexes.push(IndexMembership {
            name: name.into(),
            unique: true,
        });
        self
    }
}

/// Starts a column declaration with an explicit value type.
#[must_use]
pub fn column(name: impl Into<String>, value_type: ValueType) -> ColumnBuilder {
    ColumnBuilder::new(name, value_type)
}

/// A 32-bit integer column.
#[must_use]
pub fn int32(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ValueType::Int32)
}

/// A text column.
#[must_use]
pub fn text(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ValueType::Text)
}

/// A boolean column.
#[must_use]
pub fn boolean(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ValueType::Bool)
}

/// A date-and-time column.
#[must_use]
pub fn datetime(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ValueType::DateTime)
}

/// Declares a table and its columns.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    schema: Option<String>,
    name: String,
    columns: Vec<ColumnBuilder>,
}

/// Starts a table declaration.
#[must_use]
pub fn table(name: impl Into<String>) -> TableBuilder {
    TableBuilder {
        schema: None,
        name: name.into(),
        columns: Vec::new(),
    }
}

impl TableBuilder {
    /// Overrides the configured default schema for this table.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Adds a column declaration. Re-declaring a name replaces the
    /// earlier declaration and moves the column to the end.
    #[must_use]
    pub fn column(mut self, column: ColumnBuilder) -> Self {
        self.columns.push(column);
        self
    }
}

/// Collects table declarations and resolves them into a [`SchemaModel`].
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    config: SchemaConfig,
    tables: Vec<TableBuilder>,
}

impl ModelBuilder {
    /// Creates a builder resolving against `config`.
    #[must_use]
    pub fn new(config: SchemaConfig) -> Self {
        Self {
            config,
            tables: Vec::new(),
        }
    }

    /// Adds a table declaration. Declaration order is preserved into the
    /// generated script.
    #[must_use]
    pub fn table(mut self, table: TableBuilder) -> Self {
        self.tables.push(table);
        self
    }

    /// Resolves every declaration and validates the result.
    ///
    /// Fails on the first table without exactly one key column and on
    /// the first column whose value type has no policy mapping. Nothing
    /// downstream ever sees a partially valid model.
    pub fn build(self) -> Result<SchemaModel> {
        let config = self.config;
        let mut tables = Vec::with_capacity(self.tables.len());
        for builder in self.tables {
            tables.push(build_table(builder, &config)?);
        }
        Ok(SchemaModel { tables })
    }
}

fn build_table(builder: TableBuilder, config: &SchemaConfig) -> Result<Table> {
    let TableBuilder {
        schema,
        name,
        columns: declared,
    } = builder;
    let schema = schema.unwrap_or_else(|| config.default_schema.clone());

    // Last declaration of a name wins and takes the later position.
    let mut declarations: Vec<ColumnBuilder> = Vec::new();
    for decl in declared {
        declarations.retain(|existing| existing.name != decl.name);
        declarations.push(decl);
    }

    let mut columns = Vec::with_capacity(declarations.len());
    let mut indexes: Vec<Index> = Vec::new();
    for decl in &declarations {
        let column = resolve_column(decl, &name, config)?;
        for membership in &decl.indexes {
            match indexes.iter_mut().find(|ix| ix.name == membership.name) {
                Some(index) => index.columns.push(column.name.clone()),
                None => indexes.push(Index {
                    name: membership.name.clone(),
                    schema: schema.clone(),
                    table: name.clone(),
                    unique: membership.unique,
                    columns: vec![column.name.clone()],
                }),
            }
        }
        columns.push(column);
    }

    let key_count = columns.iter().filter(|c| c.key).count();
    if key_count == 0 {
        return Err(ConformError::NoKeyColumn {
            schema,
            table: name,
        });
    }
    if key_count > 1 {
        return Err(ConformError::MultipleKeyColumns {
            schema,
            table: name,
            count: key_count,
        });
    }

    Ok(Table {
        schema,
        name,
        columns,
        indexes,
    })
}

fn resolve_column(decl: &ColumnBuilder, table: &str, config: &SchemaConfig) -> Result<Column> {
    let db_type = policy::db_type_for(decl.value_type, config).ok_or_else(|| {
        ConformError::UnmappedType {
            value_type: decl.value_type,
            column: decl.name.clone(),
            table: table.to_string(),
        }
    })?;
    let length = policy::resolve_length(decl.value_type, decl.length, config);

    let mut nullable = policy::default_nullability(decl.value_type, decl.optional);
    if decl.required || decl.key {
        nullable = false;
    }

    Ok(Column {
        name: decl.name.clone(),
        value_type: decl.value_type,
        db_type,
        length,
        nullable,
        key: decl.key,
        identity: decl.identity,
        default: decl.default.clone(),
    })
}
