/// Database Module
///
/// The database layer is split into four concerns:
/// - **Connection Management** (`connection.rs`): the engine that hands out scoped connections
/// - **Schema Introspection** (`schema.rs`): reflection of table definitions into a cache
/// - **Values** (`value.rs`): dynamically typed values bound to and decoded from PostgreSQL
/// - **Query Execution** (`query.rs`): running built statements and collecting rows
///
/// All database operations use `PgcrudError` for error propagation.
pub mod connection;
pub mod query;
pub mod schema;
pub mod value;

pub use connection::*;
pub use query::*;
pub use schema::*;
pub use value::*;
