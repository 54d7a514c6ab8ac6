/// pgcrud Error Module
///
/// This module defines the error types for pgcrud. Lookup failures against the
/// schema cache, statement-construction faults and genuine database faults are
/// kept in separate variants so callers can tell them apart.
use postgres::error::SqlState;
use thiserror::Error;

/// Error type for every pgcrud operation.
///
/// The variants cover:
/// - Database faults reported by the PostgreSQL client (connection loss,
///   constraint violations, malformed SQL)
/// - Schema cache lookup failures (missing or already existing tables)
/// - Statement construction (invalid identifiers, operators, empty inputs)
/// - Value binding and decoding
/// - Configuration loading
#[derive(Error, Debug)]
pub enum PgcrudError {
    /// Errors raised by the PostgreSQL client
    #[error("Database error: {}", describe(.0))]
    Database(#[from] postgres::Error),

    /// The table is not present in the schema cache
    #[error("{0} table not found")]
    TableNotFound(String),

    /// The table is already present in the schema cache
    #[error("{0} table already exists")]
    TableExists(String),

    /// A referenced column does not exist on the cached table definition
    #[error("Unknown column {column} on table {table}")]
    UnknownColumn { table: String, column: String },

    /// Statement construction errors (identifiers, operators, empty inputs)
    #[error("Statement error: {0}")]
    Statement(String),

    /// Value conversion errors between Rust and PostgreSQL types
    #[error("Value error: {0}")]
    Value(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PgcrudError {
    /// Returns true for failures detected against the schema cache rather
    /// than reported by the database.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            PgcrudError::TableNotFound(_) | PgcrudError::TableExists(_)
        )
    }

    /// The SQLSTATE reported by the server, if this is a server-side error.
    pub fn sql_state(&self) -> Option<&SqlState> {
        match self {
            PgcrudError::Database(e) => e.code(),
            _ => None,
        }
    }
}

/// Server errors carry severity, SQLSTATE, message and detail; client-side
/// errors carry their cause.
fn describe(err: &postgres::Error) -> String {
    if let Some(db) = err.as_db_error() {
        let mut text = format!("{} {}: {}", db.severity(), db.code().code(), db.message());
        if let Some(detail) = db.detail() {
            text.push_str(&format!(" ({})", detail));
        }
        return text;
    }
    let text = err.to_string();
    match std::error::Error::source(err) {
        Some(cause) if !text.contains(&cause.to_string()) => format!("{}: {}", text, cause),
        _ => text,
    }
}

/// Type alias for Result to use PgcrudError as the error type.
pub type Result<T> = std::result::Result<T, PgcrudError>;
