//! The CRUD façade.
//!
//! [`CrudContext`] owns the engine and the schema cache. Every operation checks
//! the cache for the table, builds one statement, runs it on a scoped
//! connection and returns. Lookup failures follow the configured
//! [`LookupPolicy`]; database faults always propagate.

use crate::config::{Config, DatabaseConfig, LookupPolicy};
use crate::core::db::{reflect_table, Engine, QueryExecutor, ResultSet, Row, SchemaCache, TableDef};
use crate::core::{PgcrudError, Result};
use crate::statement::{validate_identifier, ColumnSpec, Condition, Record, Statement};
use postgres::error::SqlState;
use tracing::{debug, info, warn};

pub struct CrudContext {
    engine: Engine,
    schema: SchemaCache,
    policy: LookupPolicy,
}

impl CrudContext {
    /// Builds the engine and reflects the schema once.
    pub fn connect(database: &DatabaseConfig, policy: LookupPolicy) -> Result<Self> {
        validate_identifier(database.schema_name())?;
        let engine = Engine::new(database)?;
        let schema = engine.with_connection(|client| SchemaCache::reflect(client, database.schema_name()))?;
        info!(
            endpoint = %engine.endpoint(),
            schema = schema.schema(),
            tables = schema.len(),
            "connected"
        );
        Ok(CrudContext {
            engine,
            schema,
            policy,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        CrudContext::connect(&config.database, config.behavior.lookup_failures)
    }

    /// Assembles a context from parts without touching the database.
    pub fn with_schema(engine: Engine, schema: SchemaCache, policy: LookupPolicy) -> Self {
        CrudContext {
            engine,
            schema,
            policy,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn schema(&self) -> &SchemaCache {
        &self.schema
    }

    pub fn policy(&self) -> LookupPolicy {
        self.policy
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.schema.contains(table)
    }

    /// Re-reflects the schema, picking up external changes.
    pub fn refresh_schema(&mut self) -> Result<()> {
        let name = self.schema.schema().to_string();
        self.schema = self
            .engine
            .with_connection(|client| SchemaCache::reflect(client, &name))?;
        Ok(())
    }

    /// Creates `table` unless it already exists.
    ///
    /// Returns `true` when the table was created. A table that exists in the
    /// database but not in the cache is reflected into the cache and treated
    /// as already existing.
    pub fn create_table(&mut self, table: &str, columns: &[ColumnSpec]) -> Result<bool> {
        if self.schema.contains(table) {
            self.lookup_failed(PgcrudError::TableExists(table.to_string()))?;
            return Ok(false);
        }

        let schema = self.schema.schema().to_string();
        let statement = Statement::create_table(&schema, table, columns)?;
        let outcome = self.engine.with_connection(|client| {
            QueryExecutor::new(client).execute(&statement)?;
            reflect_table(client, &schema, table)
        });

        let created = match outcome {
            Ok(created) => created,
            Err(err) if err.sql_state() == Some(&SqlState::DUPLICATE_TABLE) => {
                let existing = self
                    .engine
                    .with_connection(|client| reflect_table(client, &schema, table))?;
                if let Some(def) = existing {
                    self.schema.insert(def);
                }
                self.lookup_failed(PgcrudError::TableExists(table.to_string()))?;
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        info!(table, "created table");
        match created {
            Some(def) => self.schema.insert(def),
            None => warn!(table, "created table is not visible to reflection"),
        }
        Ok(true)
    }

    /// Inserts all `records` in one statement.
    ///
    /// Returns the number of inserted rows, or `None` when the table is unknown.
    pub fn insert_records(&mut self, table: &str, records: &[Record]) -> Result<Option<u64>> {
        let Some(def) = self.lookup(table)? else {
            return Ok(None);
        };
        if records.is_empty() {
            return Ok(Some(0));
        }
        let statement = Statement::insert(self.schema.schema(), def, records)?;
        self.run(table, |executor| executor.execute(&statement))
    }

    /// Sets `values` on every row matching `condition`.
    pub fn update_records(&mut self, table: &str, condition: &Condition, values: &Record) -> Result<Option<u64>> {
        let Some(def) = self.lookup(table)? else {
            return Ok(None);
        };
        let statement = Statement::update(self.schema.schema(), def, condition, values)?;
        self.run(table, |executor| executor.execute(&statement))
    }

    /// Deletes every row matching `condition`.
    pub fn delete_records(&mut self, table: &str, condition: &Condition) -> Result<Option<u64>> {
        let Some(def) = self.lookup(table)? else {
            return Ok(None);
        };
        let statement = Statement::delete(self.schema.schema(), def, condition)?;
        self.run(table, |executor| executor.execute(&statement))
    }

    /// Truncates the table, keeping its definition.
    pub fn delete_all_records(&mut self, table: &str) -> Result<bool> {
        let Some(def) = self.lookup(table)? else {
            return Ok(false);
        };
        let statement = Statement::truncate(self.schema.schema(), def);
        if self.run(table, |executor| executor.execute(&statement))?.is_none() {
            return Ok(false);
        }
        info!(table, "truncated table");
        Ok(true)
    }

    /// Drops the table and evicts it from the cache.
    pub fn drop_table(&mut self, table: &str) -> Result<bool> {
        let Some(def) = self.lookup(table)? else {
            return Ok(false);
        };
        let statement = Statement::drop_table(self.schema.schema(), def);
        if self.run(table, |executor| executor.execute(&statement))?.is_none() {
            return Ok(false);
        }
        self.schema.remove(table);
        info!(table, "dropped table");
        Ok(true)
    }

    pub fn fetch_all_records(&mut self, table: &str) -> Result<Option<ResultSet>> {
        let Some(def) = self.lookup(table)? else {
            return Ok(None);
        };
        let statement = Statement::select(self.schema.schema(), def, None)?;
        let result = self.run(table, |executor| executor.query(&statement))?;
        Ok(result.map(ResultSet::from))
    }

    pub fn conditional_fetch(&mut self, table: &str, condition: &Condition) -> Result<Option<Vec<Row>>> {
        let Some(def) = self.lookup(table)? else {
            return Ok(None);
        };
        let statement = Statement::select(self.schema.schema(), def, Some(condition))?;
        let result = self.run(table, |executor| executor.query(&statement))?;
        Ok(result.map(|r| r.rows))
    }

    fn lookup(&self, table: &str) -> Result<Option<&TableDef>> {
        match self.schema.get(table) {
            Some(def) => Ok(Some(def)),
            None => {
                self.lookup_failed(PgcrudError::TableNotFound(table.to_string()))?;
                Ok(None)
            }
        }
    }

    fn lookup_failed(&self, err: PgcrudError) -> Result<()> {
        match self.policy {
            LookupPolicy::Log => {
                warn!("{}", err);
                Ok(())
            }
            LookupPolicy::Error => Err(err),
        }
    }

    /// Runs `f` on a scoped connection against a cached table.
    ///
    /// A table dropped behind the cache's back is evicted and reported as a
    /// lookup failure, giving `Ok(None)` under the logging policy.
    fn run<T, F>(&mut self, table: &str, f: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut QueryExecutor<'_>) -> Result<T>,
    {
        let outcome = self
            .engine
            .with_connection(|client| f(&mut QueryExecutor::new(client)));
        match outcome {
            Err(err) if err.sql_state() == Some(&SqlState::UNDEFINED_TABLE) => {
                self.schema.remove(table);
                debug!(table, "evicted table missing from the database");
                self.lookup_failed(PgcrudError::TableNotFound(table.to_string()))?;
                Ok(None)
            }
            other => other.map(Some),
        }
    }
}
