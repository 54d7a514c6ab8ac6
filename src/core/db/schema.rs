/// Schema Introspection Module
///
/// Reflects table definitions from `information_schema` into an in-memory
/// cache. The cache is a snapshot: external schema changes are not seen until
/// it is refreshed.

use crate::core::Result;
use postgres::Client;
use std::collections::HashMap;
use tracing::debug;

const COLUMNS_SQL: &str = "
    SELECT c.table_name::text,
           c.column_name::text,
           c.data_type::text,
           c.is_nullable::text,
           c.column_default::text,
           c.ordinal_position::int4
      FROM information_schema.columns c
      JOIN information_schema.tables t
        ON t.table_schema = c.table_schema
       AND t.table_name = c.table_name
     WHERE c.table_schema::text = $1::text
       AND t.table_type = 'BASE TABLE'
       AND ($2::text IS NULL OR c.table_name::text = $2::text)
     ORDER BY c.table_name, c.ordinal_position";

const PRIMARY_KEY_SQL: &str = "
    SELECT kcu.table_name::text,
           kcu.column_name::text
      FROM information_schema.table_constraints tc
      JOIN information_schema.key_column_usage kcu
        ON kcu.constraint_schema = tc.constraint_schema
       AND kcu.constraint_name = tc.constraint_name
       AND kcu.table_name = tc.table_name
     WHERE tc.constraint_type = 'PRIMARY KEY'
       AND tc.table_schema::text = $1::text
       AND ($2::text IS NULL OR tc.table_name::text = $2::text)
     ORDER BY kcu.table_name, kcu.ordinal_position";

/// Represents a reflected column with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// `information_schema` data type (e.g. "integer", "character varying")
    pub data_type: String,
    /// Whether the column allows NULL values
    pub nullable: bool,
    /// Default value expression (if any)
    pub default: Option<String>,
    /// 1-based position in the table
    pub ordinal: i32,
}

/// Represents a reflected table: the handle operations resolve a name to
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    /// Table name
    pub name: String,
    /// Columns in ordinal order
    pub columns: Vec<ColumnDef>,
    /// Primary key column names in key order
    pub primary_key: Vec<String>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        TableDef {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Snapshot of the table definitions in one PostgreSQL schema
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    schema: String,
    tables: HashMap<String, TableDef>,
}

impl SchemaCache {
    /// Creates an empty cache for the given PostgreSQL schema
    pub fn empty(schema: impl Into<String>) -> Self {
        SchemaCache {
            schema: schema.into(),
            tables: HashMap::new(),
        }
    }

    /// Reflects every base table of `schema` from the live database
    pub fn reflect(client: &mut Client, schema: &str) -> Result<Self> {
        let tables = reflect_tables(client, schema, None)?;
        debug!(schema, tables = tables.len(), "reflected schema");
        Ok(SchemaCache {
            schema: schema.to_string(),
            tables: tables.into_iter().map(|t| (t.name.clone(), t)).collect(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn get(&self, table: &str) -> Option<&TableDef> {
        self.tables.get(table)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Adds or replaces a table definition
    pub fn insert(&mut self, table: TableDef) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn remove(&mut self, table: &str) -> Option<TableDef> {
        self.tables.remove(table)
    }

    /// Table names in sorted order
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Reflects a single table, returning `None` when it does not exist
pub fn reflect_table(client: &mut Client, schema: &str, table: &str) -> Result<Option<TableDef>> {
    Ok(reflect_tables(client, schema, Some(table))?.into_iter().next())
}

fn reflect_tables(client: &mut Client, schema: &str, only: Option<&str>) -> Result<Vec<TableDef>> {
    let mut tables: Vec<TableDef> = Vec::new();

    for row in client.query(COLUMNS_SQL, &[&schema, &only])? {
        let table_name: String = row.try_get(0)?;
        let column = ColumnDef {
            name: row.try_get(1)?,
            data_type: row.try_get(2)?,
            nullable: row.try_get::<_, String>(3)? == "YES",
            default: row.try_get(4)?,
            ordinal: row.try_get(5)?,
        };
        // Rows arrive grouped by table name
        match tables.last_mut() {
            Some(table) if table.name == table_name => table.columns.push(column),
            _ => {
                let mut table = TableDef::new(table_name);
                table.columns.push(column);
                tables.push(table);
            }
        }
    }

    let mut primary_keys: HashMap<String, Vec<String>> = HashMap::new();
    for row in client.query(PRIMARY_KEY_SQL, &[&schema, &only])? {
        let table_name: String = row.try_get(0)?;
        primary_keys.entry(table_name).or_default().push(row.try_get(1)?);
    }
    for table in &mut tables {
        if let Some(pk) = primary_keys.remove(&table.name) {
            table.primary_key = pk;
        }
    }

    Ok(tables)
}
