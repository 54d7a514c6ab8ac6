/// Value Module
///
/// A dynamically typed SQL value used for record fields, condition operands and
/// fetched cells. Values are always sent as bound parameters; the server infers
/// each parameter's type from context and `SqlValue` coerces itself to match.
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use postgres::types::{FromSql, IsNull, ToSql, Type};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
    /// A fetched value whose PostgreSQL type has no decoder; holds the type name.
    Unsupported(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "integer",
            SqlValue::Float(_) => "float",
            SqlValue::Decimal(_) => "numeric",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Date(_) => "date",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::TimestampTz(_) => "timestamptz",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Json(_) => "json",
            SqlValue::Unsupported(_) => "unsupported",
        }
    }

    /// The value as unquoted text, for scalars that have a canonical text form.
    fn plain_text(&self) -> Option<String> {
        match self {
            SqlValue::Bool(b) => Some(b.to_string()),
            SqlValue::Int(i) => Some(i.to_string()),
            SqlValue::Float(v) => Some(v.to_string()),
            SqlValue::Decimal(d) => Some(d.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Date(d) => Some(d.to_string()),
            SqlValue::Timestamp(ts) => Some(ts.to_string()),
            SqlValue::TimestampTz(ts) => Some(ts.to_rfc3339()),
            SqlValue::Uuid(u) => Some(u.to_string()),
            SqlValue::Json(v) => Some(v.to_string()),
            SqlValue::Null | SqlValue::Bytes(_) | SqlValue::Unsupported(_) => None,
        }
    }

    /// Converts the value into the variant a parameter of type `ty` is encoded
    /// from.
    ///
    /// Text is parsed into the target type, integers widen to floats and
    /// numerics, and scalars render as text for character parameters. `Null`
    /// fits every type.
    ///
    /// # Errors
    ///
    /// Returns a message naming the value and the parameter type when the value
    /// cannot represent that type.
    pub fn coerce_to(&self, ty: &Type) -> Result<SqlValue, String> {
        let coerced = match (self, ty.name()) {
            (SqlValue::Null, _) => SqlValue::Null,

            (SqlValue::Bool(b), "bool") => SqlValue::Bool(*b),
            (SqlValue::Int(0), "bool") => SqlValue::Bool(false),
            (SqlValue::Int(1), "bool") => SqlValue::Bool(true),
            (SqlValue::Text(s), "bool") => {
                SqlValue::Bool(parse_bool(s).ok_or_else(|| unparsable(s, ty))?)
            }

            (SqlValue::Int(i), "int2" | "int4" | "int8") => SqlValue::Int(fit_integer(*i, ty)?),
            (SqlValue::Decimal(d), "int2" | "int4" | "int8") if d.fract().is_zero() => {
                let i = d.to_i64().ok_or_else(|| out_of_range(d, ty))?;
                SqlValue::Int(fit_integer(i, ty)?)
            }
            (SqlValue::Text(s), "int2" | "int4" | "int8") => {
                let parsed: i64 = s.trim().parse().map_err(|_| unparsable(s, ty))?;
                SqlValue::Int(fit_integer(parsed, ty)?)
            }

            (SqlValue::Float(v), "float4" | "float8") => SqlValue::Float(*v),
            (SqlValue::Int(i), "float4" | "float8") => SqlValue::Float(*i as f64),
            (SqlValue::Decimal(d), "float4" | "float8") => {
                SqlValue::Float(d.to_f64().ok_or_else(|| out_of_range(d, ty))?)
            }
            (SqlValue::Text(s), "float4" | "float8") => {
                SqlValue::Float(s.trim().parse().map_err(|_| unparsable(s, ty))?)
            }

            (SqlValue::Decimal(d), "numeric") => SqlValue::Decimal(*d),
            (SqlValue::Int(i), "numeric") => SqlValue::Decimal(Decimal::from(*i)),
            (SqlValue::Float(v), "numeric") => {
                SqlValue::Decimal(Decimal::try_from(*v).map_err(|_| out_of_range(v, ty))?)
            }
            (SqlValue::Text(s), "numeric") => {
                SqlValue::Decimal(Decimal::from_str(s.trim()).map_err(|_| unparsable(s, ty))?)
            }

            (value, "text" | "varchar" | "bpchar" | "name" | "unknown") => {
                SqlValue::Text(value.plain_text().ok_or_else(|| mismatch(value, ty))?)
            }

            (SqlValue::Bytes(b), "bytea") => SqlValue::Bytes(b.clone()),
            (SqlValue::Text(s), "bytea") => SqlValue::Bytes(s.as_bytes().to_vec()),

            (SqlValue::Date(d), "date") => SqlValue::Date(*d),
            (SqlValue::Text(s), "date") => {
                SqlValue::Date(NaiveDate::from_str(s.trim()).map_err(|_| unparsable(s, ty))?)
            }

            (SqlValue::Timestamp(ts), "timestamp") => SqlValue::Timestamp(*ts),
            (SqlValue::Date(d), "timestamp") => SqlValue::Timestamp(midnight(*d)),
            (SqlValue::Text(s), "timestamp") => {
                SqlValue::Timestamp(parse_timestamp(s).ok_or_else(|| unparsable(s, ty))?)
            }

            (SqlValue::TimestampTz(ts), "timestamptz") => SqlValue::TimestampTz(*ts),
            (SqlValue::Timestamp(ts), "timestamptz") => SqlValue::TimestampTz(Utc.from_utc_datetime(ts)),
            (SqlValue::Date(d), "timestamptz") => SqlValue::TimestampTz(Utc.from_utc_datetime(&midnight(*d))),
            (SqlValue::Text(s), "timestamptz") => {
                SqlValue::TimestampTz(parse_timestamptz(s).ok_or_else(|| unparsable(s, ty))?)
            }

            (SqlValue::Uuid(u), "uuid") => SqlValue::Uuid(*u),
            (SqlValue::Text(s), "uuid") => {
                SqlValue::Uuid(Uuid::parse_str(s.trim()).map_err(|_| unparsable(s, ty))?)
            }

            (SqlValue::Json(v), "json" | "jsonb") => SqlValue::Json(v.clone()),
            (SqlValue::Text(s), "json" | "jsonb") => {
                SqlValue::Json(serde_json::from_str(s).map_err(|_| unparsable(s, ty))?)
            }
            (SqlValue::Bool(b), "json" | "jsonb") => SqlValue::Json((*b).into()),
            (SqlValue::Int(i), "json" | "jsonb") => SqlValue::Json((*i).into()),
            (SqlValue::Float(v), "json" | "jsonb") => serde_json::Number::from_f64(*v)
                .map(|n| SqlValue::Json(n.into()))
                .ok_or_else(|| out_of_range(v, ty))?,

            (value, _) => return Err(mismatch(value, ty)),
        };
        Ok(coerced)
    }
}

/// Renders values the way a row tuple prints: text quoted, null as `None`.
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "None"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Decimal(d) => write!(f, "{}", d),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            SqlValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            SqlValue::Date(d) => write!(f, "{}", d),
            SqlValue::Timestamp(ts) => write!(f, "{}", ts),
            SqlValue::TimestampTz(ts) => write!(f, "{}", ts.to_rfc3339()),
            SqlValue::Uuid(u) => write!(f, "{}", u),
            SqlValue::Json(v) => write!(f, "{}", v),
            SqlValue::Unsupported(ty) => write!(f, "<{}>", ty),
        }
    }
}

fn mismatch(value: &SqlValue, ty: &Type) -> String {
    format!("cannot bind {} value to parameter of type {}", value.kind(), ty.name())
}

fn unparsable(text: &str, ty: &Type) -> String {
    format!("cannot parse '{}' as {}", text, ty.name())
}

fn out_of_range(value: &dyn fmt::Display, ty: &Type) -> String {
    format!("{} out of range for {}", value, ty.name())
}

fn fit_integer(value: i64, ty: &Type) -> Result<i64, String> {
    let fits = match ty.name() {
        "int2" => i16::try_from(value).is_ok(),
        "int4" => i32::try_from(value).is_ok(),
        _ => true,
    };
    if fits {
        Ok(value)
    } else {
        Err(out_of_range(&value, ty))
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::from_str(text)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| NaiveDate::from_str(text).ok().map(midnight))
}

/// Accepts RFC 3339 (or a space-separated variant with an offset); text
/// without an offset is read as UTC.
fn parse_timestamptz(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_timestamp(trimmed).map(|ts| Utc.from_utc_datetime(&ts)))
}

/// Borrows values in the shape the client expects for bound parameters.
pub fn as_params(values: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self.coerce_to(ty)? {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(b) => b.to_sql(ty, out),
            SqlValue::Int(i) => match ty.name() {
                "int2" => (i as i16).to_sql(ty, out),
                "int4" => (i as i32).to_sql(ty, out),
                _ => i.to_sql(ty, out),
            },
            SqlValue::Float(v) => match ty.name() {
                "float4" => (v as f32).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            SqlValue::Decimal(d) => d.to_sql(ty, out),
            SqlValue::Text(s) => s.as_str().to_sql(ty, out),
            SqlValue::Bytes(b) => b.as_slice().to_sql(ty, out),
            SqlValue::Date(d) => d.to_sql(ty, out),
            SqlValue::Timestamp(ts) => ts.to_sql(ty, out),
            SqlValue::TimestampTz(ts) => ts.to_sql(ty, out),
            SqlValue::Uuid(u) => u.to_sql(ty, out),
            SqlValue::Json(v) => v.to_sql(ty, out),
            value @ SqlValue::Unsupported(_) => Err(mismatch(&value, ty).into()),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    // accepts() is always true; type checks happen in coerce_to
    fn to_sql_checked(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        self.to_sql(ty, out)
    }
}

impl<'a> FromSql<'a> for SqlValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let value = match ty.name() {
            "bool" => SqlValue::Bool(bool::from_sql(ty, raw)?),
            "int2" => SqlValue::Int(i16::from_sql(ty, raw)? as i64),
            "int4" => SqlValue::Int(i32::from_sql(ty, raw)? as i64),
            "int8" => SqlValue::Int(i64::from_sql(ty, raw)?),
            "float4" => SqlValue::Float(f32::from_sql(ty, raw)? as f64),
            "float8" => SqlValue::Float(f64::from_sql(ty, raw)?),
            "numeric" => SqlValue::Decimal(Decimal::from_sql(ty, raw)?),
            "text" | "varchar" | "bpchar" | "name" | "unknown" => {
                SqlValue::Text(String::from_sql(ty, raw)?)
            }
            "bytea" => SqlValue::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            "date" => SqlValue::Date(NaiveDate::from_sql(ty, raw)?),
            "timestamp" => SqlValue::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
            "timestamptz" => SqlValue::TimestampTz(DateTime::<Utc>::from_sql(ty, raw)?),
            "uuid" => SqlValue::Uuid(Uuid::from_sql(ty, raw)?),
            "json" | "jsonb" => SqlValue::Json(serde_json::Value::from_sql(ty, raw)?),
            other => SqlValue::Unsupported(other.to_string()),
        };
        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(SqlValue::Null)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Float(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::TimestampTz(v)
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(v: serde_json::Value) -> Self {
        SqlValue::Json(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &SqlValue, ty: &Type) -> Result<Vec<u8>, BoxError> {
        let mut buf = BytesMut::new();
        match value.to_sql(ty, &mut buf)? {
            IsNull::Yes => Ok(Vec::new()),
            IsNull::No => Ok(buf.to_vec()),
        }
    }

    #[test]
    fn test_integer_narrows_to_parameter_type() {
        assert_eq!(encode(&SqlValue::Int(3), &Type::INT4).unwrap(), vec![0, 0, 0, 3]);
        assert_eq!(encode(&SqlValue::Int(3), &Type::INT2).unwrap(), vec![0, 3]);
        assert_eq!(encode(&SqlValue::Int(3), &Type::INT8).unwrap().len(), 8);
    }

    #[test]
    fn test_integer_overflow_is_rejected() {
        let err = encode(&SqlValue::Int(i64::from(i32::MAX) + 1), &Type::INT4).unwrap_err();
        assert!(err.to_string().contains("out of range for int4"));
        assert!(SqlValue::from("70000").coerce_to(&Type::INT2).is_err());
    }

    #[test]
    fn test_text_coerces_to_numeric_parameter() {
        assert_eq!(encode(&SqlValue::from("42"), &Type::INT4).unwrap(), vec![0, 0, 0, 42]);
        assert!(encode(&SqlValue::from("forty-two"), &Type::INT4).is_err());
        assert_eq!(
            SqlValue::from(" 2.5 ").coerce_to(&Type::FLOAT8).unwrap(),
            SqlValue::Float(2.5)
        );
    }

    #[test]
    fn test_numeric_parameters() {
        let price = Decimal::from_str("19.99").unwrap();
        assert_eq!(SqlValue::from(price).coerce_to(&Type::NUMERIC).unwrap(), SqlValue::Decimal(price));
        assert_eq!(SqlValue::from("19.99").coerce_to(&Type::NUMERIC).unwrap(), SqlValue::Decimal(price));
        assert_eq!(
            SqlValue::Int(7).coerce_to(&Type::NUMERIC).unwrap(),
            SqlValue::Decimal(Decimal::from(7))
        );
        assert!(matches!(
            SqlValue::Float(0.5).coerce_to(&Type::NUMERIC).unwrap(),
            SqlValue::Decimal(_)
        ));
        assert!(SqlValue::from("cheap").coerce_to(&Type::NUMERIC).is_err());
        assert!(!encode(&SqlValue::from(price), &Type::NUMERIC).unwrap().is_empty());
    }

    #[test]
    fn test_decimal_narrows_to_integer_when_whole() {
        let whole = SqlValue::from(Decimal::from(12));
        assert_eq!(whole.coerce_to(&Type::INT4).unwrap(), SqlValue::Int(12));
        let fractional = SqlValue::from(Decimal::from_str("1.5").unwrap());
        assert!(fractional.coerce_to(&Type::INT4).is_err());
        assert_eq!(fractional.coerce_to(&Type::FLOAT8).unwrap(), SqlValue::Float(1.5));
    }

    #[test]
    fn test_text_coerces_to_bool() {
        assert_eq!(SqlValue::from("yes").coerce_to(&Type::BOOL).unwrap(), SqlValue::Bool(true));
        assert_eq!(SqlValue::from("F").coerce_to(&Type::BOOL).unwrap(), SqlValue::Bool(false));
        assert_eq!(SqlValue::Int(1).coerce_to(&Type::BOOL).unwrap(), SqlValue::Bool(true));
        assert!(SqlValue::from("maybe").coerce_to(&Type::BOOL).is_err());
        assert!(SqlValue::Int(2).coerce_to(&Type::BOOL).is_err());
    }

    #[test]
    fn test_text_coerces_to_temporal_types() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let noon = date.and_hms_opt(12, 30, 0).unwrap();

        assert_eq!(SqlValue::from("2024-02-29").coerce_to(&Type::DATE).unwrap(), SqlValue::Date(date));
        assert!(SqlValue::from("2023-02-29").coerce_to(&Type::DATE).is_err());

        assert_eq!(
            SqlValue::from("2024-02-29 12:30:00").coerce_to(&Type::TIMESTAMP).unwrap(),
            SqlValue::Timestamp(noon)
        );
        assert_eq!(
            SqlValue::from("2024-02-29T12:30:00").coerce_to(&Type::TIMESTAMP).unwrap(),
            SqlValue::Timestamp(noon)
        );
        assert_eq!(
            SqlValue::Date(date).coerce_to(&Type::TIMESTAMP).unwrap(),
            SqlValue::Timestamp(midnight(date))
        );

        let utc_noon = Utc.from_utc_datetime(&noon);
        assert_eq!(
            SqlValue::from("2024-02-29T14:30:00+02:00").coerce_to(&Type::TIMESTAMPTZ).unwrap(),
            SqlValue::TimestampTz(utc_noon)
        );
        assert_eq!(
            SqlValue::from("2024-02-29 12:30:00").coerce_to(&Type::TIMESTAMPTZ).unwrap(),
            SqlValue::TimestampTz(utc_noon)
        );
        assert_eq!(
            SqlValue::Timestamp(noon).coerce_to(&Type::TIMESTAMPTZ).unwrap(),
            SqlValue::TimestampTz(utc_noon)
        );
    }

    #[test]
    fn test_text_coerces_to_uuid_and_json() {
        let id = Uuid::new_v4();
        assert_eq!(SqlValue::from(id.to_string()).coerce_to(&Type::UUID).unwrap(), SqlValue::Uuid(id));
        assert!(SqlValue::from("not-a-uuid").coerce_to(&Type::UUID).is_err());

        assert_eq!(
            SqlValue::from(r#"{"tier": "gold"}"#).coerce_to(&Type::JSONB).unwrap(),
            SqlValue::Json(serde_json::json!({"tier": "gold"}))
        );
        assert_eq!(SqlValue::Int(3).coerce_to(&Type::JSON).unwrap(), SqlValue::Json(3.into()));
        assert!(SqlValue::from("{broken").coerce_to(&Type::JSON).is_err());
    }

    #[test]
    fn test_scalars_render_as_text_for_character_parameters() {
        assert_eq!(SqlValue::Int(5).coerce_to(&Type::VARCHAR).unwrap(), SqlValue::from("5"));
        assert_eq!(SqlValue::Bool(false).coerce_to(&Type::TEXT).unwrap(), SqlValue::from("false"));
        assert!(SqlValue::Bytes(vec![1]).coerce_to(&Type::TEXT).is_err());
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let err = encode(&SqlValue::Bool(true), &Type::INT4).unwrap_err();
        assert_eq!(err.to_string(), "cannot bind bool value to parameter of type int4");
    }

    #[test]
    fn test_null_binds_to_any_type() {
        let mut buf = BytesMut::new();
        assert!(matches!(SqlValue::Null.to_sql(&Type::UUID, &mut buf).unwrap(), IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_from_wire_bytes() {
        assert_eq!(SqlValue::from_sql(&Type::INT4, &[0, 0, 0, 7]).unwrap(), SqlValue::Int(7));
        assert_eq!(SqlValue::from_sql(&Type::BOOL, &[1]).unwrap(), SqlValue::Bool(true));
        assert_eq!(
            SqlValue::from_sql(&Type::VARCHAR, b"Clan").unwrap(),
            SqlValue::Text("Clan".to_string())
        );
        assert_eq!(SqlValue::from_sql_null(&Type::TEXT).unwrap(), SqlValue::Null);

        let mut buf = BytesMut::new();
        Decimal::from_str("12.50").unwrap().to_sql(&Type::NUMERIC, &mut buf).unwrap();
        assert_eq!(
            SqlValue::from_sql(&Type::NUMERIC, &buf).unwrap(),
            SqlValue::Decimal(Decimal::from_str("12.50").unwrap())
        );
    }

    #[test]
    fn test_unknown_type_decodes_as_unsupported() {
        let value = SqlValue::from_sql(&Type::INET, &[2, 32, 0, 4, 127, 0, 0, 1]).unwrap();
        assert_eq!(value, SqlValue::Unsupported("inet".to_string()));
    }

    #[test]
    fn test_display_like_row_tuple() {
        assert_eq!(SqlValue::from("Calvin").to_string(), "'Calvin'");
        assert_eq!(SqlValue::from("O'Brien").to_string(), r"'O\'Brien'");
        assert_eq!(SqlValue::from(Option::<i32>::None).to_string(), "None");
        assert_eq!(SqlValue::from(12i32).to_string(), "12");
    }
}
