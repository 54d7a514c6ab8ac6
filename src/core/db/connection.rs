/// Connection Management Module
///
/// The engine is the connection factory for one configured endpoint. It holds
/// no open connection itself; every operation borrows a fresh connection for
/// the length of one scope and closes it on exit.

use crate::config::DatabaseConfig;
use crate::core::Result;
use postgres::{Client, NoTls};
use tracing::{debug, error};

/// Connection factory for a single PostgreSQL endpoint
pub struct Engine {
    config: postgres::Config,
    endpoint: String,
}

impl Engine {
    /// Creates an engine for the configured endpoint without connecting
    ///
    /// # Errors
    ///
    /// Returns `PgcrudError::Config` when the connection string cannot be parsed.
    pub fn new(database: &DatabaseConfig) -> Result<Self> {
        Ok(Engine {
            config: database.to_pg_config()?,
            endpoint: database.endpoint(),
        })
    }

    /// The endpoint this engine connects to, without credentials
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Opens a new connection
    ///
    /// # Errors
    ///
    /// Returns `PgcrudError::Database` when the server cannot be reached or
    /// rejects the credentials.
    pub fn connect(&self) -> Result<Client> {
        debug!(endpoint = %self.endpoint, "opening connection");
        self.config.connect(NoTls).map_err(|e| {
            error!(endpoint = %self.endpoint, error = %e, "connection failed");
            e.into()
        })
    }

    /// Runs `f` with a connection that is closed when `f` returns
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pgcrud::config::DatabaseConfig;
    /// # use pgcrud::core::db::Engine;
    /// let engine = Engine::new(&DatabaseConfig::from_url("postgresql://postgres@localhost/postgres"))?;
    /// let one: i32 = engine.with_connection(|client| Ok(client.query_one("SELECT 1", &[])?.get(0)))?;
    /// # Ok::<(), pgcrud::core::PgcrudError>(())
    /// ```
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Client) -> Result<T>,
    {
        let mut client = self.connect()?;
        let result = f(&mut client);
        if let Err(e) = client.close() {
            debug!(endpoint = %self.endpoint, error = %e, "error while closing connection");
        }
        result
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("endpoint", &self.endpoint).finish()
    }
}
