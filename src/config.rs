use crate::core::{PgcrudError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USER: &str = "postgres";
const DEFAULT_SCHEMA: &str = "public";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    pub logging: Option<LoggingConfig>,
}

/// Database endpoint configuration.
///
/// Either `url` or the discrete fields describe the endpoint. When `url` is
/// present the discrete endpoint fields are ignored, but `connect_timeout_secs`
/// and `application_name` still apply.
#[derive(Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub schema: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub application_name: Option<String>,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("endpoint", &self.endpoint())
            .field("schema", &self.schema_name())
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("application_name", &self.application_name)
            .finish()
    }
}

impl DatabaseConfig {
    /// Builds a configuration from a `postgresql://` connection string.
    pub fn from_url(url: impl Into<String>) -> Self {
        DatabaseConfig {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// The PostgreSQL schema whose tables are reflected and operated on.
    pub fn schema_name(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// Converts this configuration into a client configuration.
    pub fn to_pg_config(&self) -> Result<postgres::Config> {
        let mut config = match &self.url {
            Some(url) => postgres::Config::from_str(url)
                .map_err(|e| PgcrudError::Config(format!("invalid database url: {}", e)))?,
            None => {
                let mut config = postgres::Config::new();
                config
                    .host(self.host.as_deref().unwrap_or(DEFAULT_HOST))
                    .port(self.port.unwrap_or(DEFAULT_PORT))
                    .user(self.user.as_deref().unwrap_or(DEFAULT_USER));
                if let Some(dbname) = &self.dbname {
                    config.dbname(dbname);
                }
                if let Some(password) = &self.password {
                    config.password(password);
                }
                config
            }
        };

        if let Some(secs) = self.connect_timeout_secs {
            config.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(name) = &self.application_name {
            config.application_name(name);
        }
        Ok(config)
    }

    /// Human-readable endpoint without credentials, e.g. `postgres@localhost:5432/Tutorials`.
    pub fn endpoint(&self) -> String {
        match self.to_pg_config() {
            Ok(config) => describe_endpoint(&config),
            Err(_) => "<invalid database url>".to_string(),
        }
    }
}

fn describe_endpoint(config: &postgres::Config) -> String {
    let host = config
        .get_hosts()
        .first()
        .map(|host| match host {
            postgres::config::Host::Tcp(name) => name.clone(),
            #[allow(unreachable_patterns)]
            other => format!("{:?}", other),
        })
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = config.get_ports().first().copied().unwrap_or(DEFAULT_PORT);
    let user = config.get_user().unwrap_or(DEFAULT_USER);
    let dbname = config.get_dbname().unwrap_or(user);
    format!("{}@{}:{}/{}", user, host, port, dbname)
}

/// What to do when a table lookup against the schema cache fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupPolicy {
    /// Log a warning and skip the operation.
    #[default]
    Log,
    /// Return the failure to the caller.
    Error,
}

/// Behavioral switches for the CRUD façade.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BehaviorConfig {
    #[serde(default)]
    pub lookup_failures: LookupPolicy,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as `pgcrud=debug`.
    pub filter: Option<String>,
}

impl FromStr for Config {
    type Err = PgcrudError;

    fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = pgcrud::config::load_config("pgcrud.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    content.parse()
}

/// Location of the per-user configuration file, e.g. `~/.config/pgcrud/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pgcrud").join("config.toml"))
}
