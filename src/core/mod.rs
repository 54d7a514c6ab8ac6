/// Core Module for pgcrud
///
/// Shared infrastructure for the CRUD façade: the database layer (engine,
/// reflection, values, execution) and the crate error type.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{PgcrudError, Result};
