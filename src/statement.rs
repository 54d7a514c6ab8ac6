//! Statement building for the CRUD façade.
//!
//! Every statement is rendered with quoted, schema-qualified identifiers and
//! `$n` placeholders; values never appear in the SQL text.

use crate::core::db::{SqlValue, TableDef};
use crate::core::{PgcrudError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// PostgreSQL truncates identifiers longer than NAMEDATALEN - 1 bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$ ]*$").expect("identifier pattern is valid"));

/// Checks that `name` is usable as a schema, table or column name.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(PgcrudError::Statement(format!(
            "identifier '{}' is longer than {} bytes",
            name, MAX_IDENTIFIER_LEN
        )));
    }
    if !IDENTIFIER.is_match(name) {
        return Err(PgcrudError::Statement(format!("invalid identifier '{}'", name)));
    }
    Ok(())
}

/// Double-quotes an identifier, doubling any embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Comparison operators allowed in a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,
    ILike,
    NotILike,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::ILike => "ILIKE",
            Operator::NotILike => "NOT ILIKE",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator compares against a bound value
    pub fn takes_value(&self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

impl FromStr for Operator {
    type Err = PgcrudError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        let op = match normalized.as_str() {
            "=" | "==" => Operator::Eq,
            "!=" | "<>" => Operator::NotEq,
            "<" => Operator::Lt,
            "<=" => Operator::LtEq,
            ">" => Operator::Gt,
            ">=" => Operator::GtEq,
            "LIKE" => Operator::Like,
            "NOT LIKE" => Operator::NotLike,
            "ILIKE" => Operator::ILike,
            "NOT ILIKE" => Operator::NotILike,
            "IS NULL" => Operator::IsNull,
            "IS NOT NULL" => Operator::IsNotNull,
            _ => {
                return Err(PgcrudError::Statement(format!(
                    "unsupported condition operator '{}'",
                    s
                )))
            }
        };
        Ok(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A single `column operator value` filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: SqlValue,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<SqlValue>) -> Self {
        Condition {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Builds a condition from a textual operator such as `">"` or `"!="`.
    pub fn parse(column: impl Into<String>, operator: &str, value: impl Into<SqlValue>) -> Result<Self> {
        Ok(Condition::new(column, operator.parse()?, value))
    }

    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Condition::new(column, Operator::Eq, value)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Condition::new(column, Operator::IsNull, SqlValue::Null)
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Condition::new(column, Operator::IsNotNull, SqlValue::Null)
    }

    fn render(&self, params: &mut Vec<SqlValue>) -> String {
        let column = quote_ident(&self.column);
        if self.operator.takes_value() {
            params.push(self.value.clone());
            format!("{} {} ${}", column, self.operator, params.len())
        } else {
            format!("{} {}", column, self.operator)
        }
    }
}

/// An ordered set of `field -> value` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// Sets a field, replacing an earlier value for the same name.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields.iter().find(|(name, _)| name == field).map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().fold(Record::new(), |record, (k, v)| record.set(k, v))
    }
}

/// Column types accepted by `create_table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Text,
    Varchar(Option<u32>),
    Boolean,
    Date,
    Timestamp,
    TimestampTz,
    Uuid,
    Json,
    Jsonb,
    Bytea,
}

impl ColumnType {
    fn is_integer(&self) -> bool {
        matches!(self, ColumnType::SmallInt | ColumnType::Integer | ColumnType::BigInt)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::SmallInt => f.write_str("SMALLINT"),
            ColumnType::Integer => f.write_str("INTEGER"),
            ColumnType::BigInt => f.write_str("BIGINT"),
            ColumnType::Real => f.write_str("REAL"),
            ColumnType::Double => f.write_str("DOUBLE PRECISION"),
            ColumnType::Numeric => f.write_str("NUMERIC"),
            ColumnType::Text => f.write_str("TEXT"),
            ColumnType::Varchar(None) => f.write_str("VARCHAR"),
            ColumnType::Varchar(Some(len)) => write!(f, "VARCHAR({})", len),
            ColumnType::Boolean => f.write_str("BOOLEAN"),
            ColumnType::Date => f.write_str("DATE"),
            ColumnType::Timestamp => f.write_str("TIMESTAMP"),
            ColumnType::TimestampTz => f.write_str("TIMESTAMPTZ"),
            ColumnType::Uuid => f.write_str("UUID"),
            ColumnType::Json => f.write_str("JSON"),
            ColumnType::Jsonb => f.write_str("JSONB"),
            ColumnType::Bytea => f.write_str("BYTEA"),
        }
    }
}

/// A column definition for `create_table`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub autoincrement: bool,
    pub nullable: bool,
    pub unique: bool,
    /// Trusted SQL expression, rendered verbatim after `DEFAULT`.
    pub default: Option<String>,
    /// `(table, column)` this column references.
    pub references: Option<(String, String)>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        ColumnSpec {
            name: name.into(),
            column_type,
            primary_key: false,
            autoincrement: false,
            nullable: true,
            unique: false,
            default: None,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some((table.into(), column.into()));
        self
    }

    fn render(&self, schema: &str) -> Result<String> {
        validate_identifier(&self.name)?;
        let mut sql = format!("{} {}", quote_ident(&self.name), self.column_type);
        if self.autoincrement {
            if !self.column_type.is_integer() {
                return Err(PgcrudError::Statement(format!(
                    "autoincrement column '{}' must have an integer type",
                    self.name
                )));
            }
            sql.push_str(" GENERATED BY DEFAULT AS IDENTITY");
        }
        if !self.nullable && !self.primary_key {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(expr) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(expr);
        }
        if let Some((table, column)) = &self.references {
            validate_identifier(table)?;
            validate_identifier(column)?;
            sql.push_str(&format!(
                " REFERENCES {} ({})",
                qualified(schema, table),
                quote_ident(column)
            ));
        }
        Ok(sql)
    }
}

/// The kind of statement a [`Statement`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable,
    Insert,
    Update,
    Delete,
    Truncate,
    DropTable,
    Select,
}

/// A rendered statement plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    fn new(kind: StatementKind, sql: String, params: Vec<SqlValue>) -> Self {
        Statement { kind, sql, params }
    }

    pub fn create_table(schema: &str, table: &str, columns: &[ColumnSpec]) -> Result<Self> {
        validate_identifier(table)?;
        if columns.is_empty() {
            return Err(PgcrudError::Statement(format!(
                "table '{}' needs at least one column",
                table
            )));
        }
        let mut seen: Vec<&str> = Vec::with_capacity(columns.len());
        for column in columns {
            if seen.contains(&column.name.as_str()) {
                return Err(PgcrudError::Statement(format!(
                    "duplicate column '{}' in table '{}'",
                    column.name, table
                )));
            }
            seen.push(&column.name);
        }

        let mut parts = columns
            .iter()
            .map(|c| c.render(schema))
            .collect::<Result<Vec<_>>>()?;
        let primary_key: Vec<String> = columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| quote_ident(&c.name))
            .collect();
        if !primary_key.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", primary_key.join(", ")));
        }

        let sql = format!("CREATE TABLE {} ({})", qualified(schema, table), parts.join(", "));
        Ok(Statement::new(StatementKind::CreateTable, sql, Vec::new()))
    }

    /// Multi-row insert. Columns are the union of record fields in first-seen
    /// order; a record without a column contributes `DEFAULT` for it.
    pub fn insert(schema: &str, table: &TableDef, records: &[Record]) -> Result<Self> {
        let mut columns: Vec<&str> = Vec::new();
        for record in records {
            for (field, _) in record.fields() {
                if !columns.contains(&field) {
                    require_column(table, field)?;
                    columns.push(field);
                }
            }
        }
        if columns.is_empty() {
            return Err(PgcrudError::Statement(format!(
                "insert into '{}' has no columns",
                table.name
            )));
        }

        let mut params = Vec::new();
        let rows: Vec<String> = records
            .iter()
            .map(|record| {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|column| match record.get(column) {
                        Some(value) => {
                            params.push(value.clone());
                            format!("${}", params.len())
                        }
                        None => "DEFAULT".to_string(),
                    })
                    .collect();
                format!("({})", cells.join(", "))
            })
            .collect();

        let column_list: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            qualified(schema, &table.name),
            column_list.join(", "),
            rows.join(", ")
        );
        Ok(Statement::new(StatementKind::Insert, sql, params))
    }

    pub fn update(schema: &str, table: &TableDef, condition: &Condition, values: &Record) -> Result<Self> {
        if values.is_empty() {
            return Err(PgcrudError::Statement(format!(
                "update of '{}' sets no columns",
                table.name
            )));
        }
        require_column(table, &condition.column)?;

        let mut params = Vec::new();
        let mut assignments = Vec::with_capacity(values.len());
        for (field, value) in values.fields() {
            require_column(table, field)?;
            params.push(value.clone());
            assignments.push(format!("{} = ${}", quote_ident(field), params.len()));
        }
        let filter = condition.render(&mut params);

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            qualified(schema, &table.name),
            assignments.join(", "),
            filter
        );
        Ok(Statement::new(StatementKind::Update, sql, params))
    }

    pub fn delete(schema: &str, table: &TableDef, condition: &Condition) -> Result<Self> {
        require_column(table, &condition.column)?;
        let mut params = Vec::new();
        let filter = condition.render(&mut params);
        let sql = format!("DELETE FROM {} WHERE {}", qualified(schema, &table.name), filter);
        Ok(Statement::new(StatementKind::Delete, sql, params))
    }

    pub fn truncate(schema: &str, table: &TableDef) -> Self {
        let sql = format!("TRUNCATE TABLE {}", qualified(schema, &table.name));
        Statement::new(StatementKind::Truncate, sql, Vec::new())
    }

    pub fn drop_table(schema: &str, table: &TableDef) -> Self {
        let sql = format!("DROP TABLE {}", qualified(schema, &table.name));
        Statement::new(StatementKind::DropTable, sql, Vec::new())
    }

    pub fn select(schema: &str, table: &TableDef, condition: Option<&Condition>) -> Result<Self> {
        let mut sql = format!("SELECT * FROM {}", qualified(schema, &table.name));
        let mut params = Vec::new();
        if let Some(condition) = condition {
            require_column(table, &condition.column)?;
            sql.push_str(" WHERE ");
            sql.push_str(&condition.render(&mut params));
        }
        Ok(Statement::new(StatementKind::Select, sql, params))
    }
}

fn require_column(table: &TableDef, column: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(PgcrudError::UnknownColumn {
            table: table.name.clone(),
            column: column.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::ColumnDef;

    fn customer() -> TableDef {
        let mut table = TableDef::new("Customer");
        for (i, name) in ["customer_id", "first_name", "last_name", "town"].iter().enumerate() {
            table.columns.push(ColumnDef {
                name: name.to_string(),
                data_type: "text".to_string(),
                nullable: true,
                default: None,
                ordinal: i as i32 + 1,
            });
        }
        table
    }

    #[test]
    fn test_operator_allow_list() {
        assert_eq!(">".parse::<Operator>().unwrap(), Operator::Gt);
        assert_eq!("!=".parse::<Operator>().unwrap(), Operator::NotEq);
        assert_eq!("not   like".parse::<Operator>().unwrap(), Operator::NotLike);
        assert_eq!(" is null ".parse::<Operator>().unwrap(), Operator::IsNull);
        assert!("= 1; DROP TABLE x; --".parse::<Operator>().is_err());
        assert!("".parse::<Operator>().is_err());
    }

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("Customer").is_ok());
        assert!(validate_identifier("first name").is_ok());
        assert!(validate_identifier("_tmp$1").is_ok());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("x\"; DROP TABLE y").is_err());
        assert!(validate_identifier(&"a".repeat(64)).is_err());
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_update_binds_values_then_filter() {
        let values = Record::new().set("first_name", "zlan").set("last_name", "zalker");
        let condition = Condition::parse("customer_id", ">", 3).unwrap();
        let stmt = Statement::update("public", &customer(), &condition, &values).unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE \"public\".\"Customer\" SET \"first_name\" = $1, \"last_name\" = $2 WHERE \"customer_id\" > $3"
        );
        assert_eq!(
            stmt.params,
            vec![SqlValue::from("zlan"), SqlValue::from("zalker"), SqlValue::Int(3)]
        );
    }

    #[test]
    fn test_insert_fills_missing_fields_with_default() {
        let records = vec![
            Record::new().set("first_name", "Clan").set("last_name", "Calvin"),
            Record::new().set("first_name", "Flan").set("town", "AV"),
        ];
        let stmt = Statement::insert("public", &customer(), &records).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"public\".\"Customer\" (\"first_name\", \"last_name\", \"town\") \
             VALUES ($1, $2, DEFAULT), ($3, DEFAULT, $4)"
        );
        assert_eq!(stmt.params.len(), 4);
        assert_eq!(stmt.params[3], SqlValue::from("AV"));
    }

    #[test]
    fn test_insert_rejects_unknown_and_empty_columns() {
        let err = Statement::insert("public", &customer(), &[Record::new().set("nickname", "x")]).unwrap_err();
        assert!(matches!(err, PgcrudError::UnknownColumn { ref column, .. } if column == "nickname"));

        let err = Statement::insert("public", &customer(), &[Record::new()]).unwrap_err();
        assert!(matches!(err, PgcrudError::Statement(_)));
    }

    #[test]
    fn test_delete_and_select_filters() {
        let condition = Condition::parse("customer_id", "<=", 2).unwrap();
        let delete = Statement::delete("public", &customer(), &condition).unwrap();
        assert_eq!(delete.sql, "DELETE FROM \"public\".\"Customer\" WHERE \"customer_id\" <= $1");

        let select = Statement::select("public", &customer(), Some(&Condition::is_null("town"))).unwrap();
        assert_eq!(select.sql, "SELECT * FROM \"public\".\"Customer\" WHERE \"town\" IS NULL");
        assert!(select.params.is_empty());

        let all = Statement::select("public", &customer(), None).unwrap();
        assert_eq!(all.sql, "SELECT * FROM \"public\".\"Customer\"");
        assert_eq!(all.kind, StatementKind::Select);
    }

    #[test]
    fn test_condition_column_must_exist() {
        let condition = Condition::eq("customer_id; --", 1);
        assert!(matches!(
            Statement::delete("public", &customer(), &condition),
            Err(PgcrudError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_update_requires_values() {
        let condition = Condition::eq("customer_id", 1);
        assert!(Statement::update("public", &customer(), &condition, &Record::new()).is_err());
    }

    #[test]
    fn test_truncate_and_drop() {
        let table = customer();
        assert_eq!(Statement::truncate("public", &table).sql, "TRUNCATE TABLE \"public\".\"Customer\"");
        assert_eq!(Statement::drop_table("crm", &table).sql, "DROP TABLE \"crm\".\"Customer\"");
    }

    #[test]
    fn test_create_table_validation() {
        assert!(Statement::create_table("public", "Empty", &[]).is_err());

        let dup = [
            ColumnSpec::new("id", ColumnType::Integer),
            ColumnSpec::new("id", ColumnType::Text),
        ];
        assert!(Statement::create_table("public", "Dup", &dup).is_err());

        let bad_serial = [ColumnSpec::new("code", ColumnType::Text).autoincrement()];
        assert!(Statement::create_table("public", "Bad", &bad_serial).is_err());
    }

    #[test]
    fn test_record_set_replaces_existing_field() {
        let record: Record = vec![("first_name", "Clan"), ("first_name", "Dev")].into_iter().collect();
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("first_name"), Some(&SqlValue::from("Dev")));
    }
}
