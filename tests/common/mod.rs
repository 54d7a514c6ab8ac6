//! Live database fixture.
//!
//! Tests using [`TableFixture`] are `#[ignore]`d by default. Run them with
//! `cargo test -- --ignored` and `PGCRUD_TEST_DATABASE_URL` pointing at a
//! disposable PostgreSQL database.

use pgcrud::config::{DatabaseConfig, LookupPolicy};
use pgcrud::{ColumnSpec, ColumnType, CrudContext, Record};

pub const DATABASE_URL_VAR: &str = "PGCRUD_TEST_DATABASE_URL";

pub fn database_config() -> DatabaseConfig {
    match std::env::var(DATABASE_URL_VAR) {
        Ok(url) if !url.is_empty() => DatabaseConfig::from_url(url),
        _ => panic!("{} must point at a disposable database to run live tests", DATABASE_URL_VAR),
    }
}

/// A second, independent context on the test database
pub fn connect(policy: LookupPolicy) -> CrudContext {
    CrudContext::connect(&database_config(), policy).expect("connect to test database")
}

/// A uniquely named table that is dropped when the fixture goes out of scope
pub struct TableFixture {
    pub ctx: CrudContext,
    pub table: String,
}

impl TableFixture {
    /// Connects and reserves a fresh table name without creating it
    pub fn new(policy: LookupPolicy) -> Self {
        let table = format!("pgcrud_{}", uuid::Uuid::new_v4().simple());
        TableFixture {
            ctx: connect(policy),
            table,
        }
    }

    /// Connects and creates the customer table
    pub fn customers(policy: LookupPolicy) -> Self {
        let mut fixture = Self::new(policy);
        let created = fixture
            .ctx
            .create_table(&fixture.table, &customer_columns())
            .expect("create customer table");
        assert!(created);
        fixture
    }
}

impl Drop for TableFixture {
    fn drop(&mut self) {
        if self.ctx.has_table(&self.table) {
            let _ = self.ctx.drop_table(&self.table);
        }
    }
}

pub fn customer_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("customer_id", ColumnType::Integer).primary_key().autoincrement(),
        ColumnSpec::new("first_name", ColumnType::Varchar(None)),
        ColumnSpec::new("last_name", ColumnType::Varchar(None)),
        ColumnSpec::new("username", ColumnType::Varchar(None)),
        ColumnSpec::new("email", ColumnType::Varchar(None)),
        ColumnSpec::new("address", ColumnType::Varchar(None)),
        ColumnSpec::new("town", ColumnType::Varchar(None)),
    ]
}

pub fn customer(first: &str, last: &str) -> Record {
    let username = format!("{}{}", first, last).to_lowercase();
    Record::new()
        .set("first_name", first)
        .set("last_name", last)
        .set("email", format!("{}@company.com", username))
        .set("username", username)
        .set("address", "Av Town, U.S. Post 21")
        .set("town", "AV")
}
