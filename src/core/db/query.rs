/// Query Execution Module
///
/// Runs built statements on a connection and collects fetched rows into
/// dynamically typed values.

use crate::core::db::{as_params, SqlValue};
use crate::core::{PgcrudError, Result};
use crate::statement::Statement;
use postgres::types::Type;
use postgres::Client;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A fetched row: one value per result column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Row { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a column position
    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Value for a column name
    pub fn get_by_name(&self, column: &str) -> Option<&SqlValue> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// Prints as a tuple, e.g. `(1, 'Clan', 'Calvin')`.
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

/// Represents the result of a query: column names and all fetched rows
#[derive(Debug)]
pub struct QueryResult {
    pub columns: Arc<[String]>,
    pub rows: Vec<Row>,
    pub row_count: usize,
}

impl QueryResult {
    pub fn new(columns: Arc<[String]>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }
}

/// Single-pass sequence of rows returned by a full-table fetch.
#[derive(Debug)]
pub struct ResultSet {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Row>,
}

impl ResultSet {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Drains the remaining rows into a list.
    pub fn fetch_all(self) -> Vec<Row> {
        self.rows.collect()
    }
}

impl From<QueryResult> for ResultSet {
    fn from(result: QueryResult) -> Self {
        ResultSet {
            columns: result.columns,
            rows: result.rows.into_iter(),
        }
    }
}

impl Iterator for ResultSet {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for ResultSet {}

/// Query execution service that operates on a database connection
pub struct QueryExecutor<'a> {
    client: &'a mut Client,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(client: &'a mut Client) -> Self {
        QueryExecutor { client }
    }

    /// Executes a statement that returns no rows
    ///
    /// # Returns
    ///
    /// The number of rows affected (zero for DDL).
    pub fn execute(&mut self, statement: &Statement) -> Result<u64> {
        debug!(kind = ?statement.kind, sql = %statement.sql, params = statement.params.len(), "executing statement");
        let prepared = self.client.prepare(&statement.sql)?;
        let values = bind_params(&statement.params, prepared.params())?;
        let affected = self.client.execute(&prepared, &as_params(&values))?;
        Ok(affected)
    }

    /// Executes a statement and collects every row
    pub fn query(&mut self, statement: &Statement) -> Result<QueryResult> {
        debug!(kind = ?statement.kind, sql = %statement.sql, params = statement.params.len(), "running query");
        let prepared = self.client.prepare(&statement.sql)?;
        let values = bind_params(&statement.params, prepared.params())?;
        let columns: Arc<[String]> = prepared
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let rows = self
            .client
            .query(&prepared, &as_params(&values))?
            .iter()
            .map(|row| {
                let values = (0..row.len())
                    .map(|i| row.try_get::<_, SqlValue>(i))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(Row::new(Arc::clone(&columns), values))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryResult::new(columns, rows))
    }
}

/// Coerces each value to the parameter type the server inferred for it.
///
/// # Errors
///
/// Returns `PgcrudError::Value` naming the first parameter that cannot take
/// its value, or `PgcrudError::Statement` when the counts differ.
pub fn bind_params(values: &[SqlValue], types: &[Type]) -> Result<Vec<SqlValue>> {
    if values.len() != types.len() {
        return Err(PgcrudError::Statement(format!(
            "statement expects {} parameters but {} were given",
            types.len(),
            values.len()
        )));
    }
    values
        .iter()
        .zip(types)
        .enumerate()
        .map(|(i, (value, ty))| {
            value
                .coerce_to(ty)
                .map_err(|e| PgcrudError::Value(format!("parameter ${}: {}", i + 1, e)))
        })
        .collect()
}
