//! PostgreSQL column types
//!
//! Maps the many spellings PostgreSQL accepts for a type onto one
//! [`ColumnType`], so the registry and a parsed DDL dump can be compared
//! column by column.

use serde::Serialize;
use std::fmt;

/// The type of a column, normalized across PostgreSQL aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    SmallInt,
    Integer,
    BigInt,
    Numeric,
    Boolean,
    Timestamptz,
    Timestamp,
    Date,
    Uuid,
    Json,
}

impl ColumnType {
    /// Parse a SQL type name such as `character varying(255)` or `int8`.
    ///
    /// Arrays, domains and user-defined types return `None`.
    pub fn from_sql(type_name: &str) -> Option<Self> {
        let normalized = normalize_type(type_name);
        if normalized.ends_with("[]") {
            return None;
        }

        let column_type = match extract_base_type(&normalized).as_str() {
            "TEXT" | "VARCHAR" | "CHAR" | "CHARACTER" | "CITEXT" | "NAME" => ColumnType::Text,
            "SMALLINT" | "INT2" | "SMALLSERIAL" | "SERIAL2" => ColumnType::SmallInt,
            "INTEGER" | "INT" | "INT4" | "SERIAL" | "SERIAL4" => ColumnType::Integer,
            "BIGINT" | "INT8" | "BIGSERIAL" | "SERIAL8" => ColumnType::BigInt,
            "NUMERIC" | "DECIMAL" | "REAL" | "FLOAT4" | "DOUBLE PRECISION" | "FLOAT8" | "FLOAT" => {
                ColumnType::Numeric
            }
            "BOOLEAN" | "BOOL" => ColumnType::Boolean,
            "TIMESTAMPTZ" => ColumnType::Timestamptz,
            "TIMESTAMP" => ColumnType::Timestamp,
            "DATE" => ColumnType::Date,
            "UUID" => ColumnType::Uuid,
            "JSON" | "JSONB" => ColumnType::Json,
            _ => return None,
        };

        Some(column_type)
    }

    /// Canonical PostgreSQL spelling
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamptz => "TIMESTAMPTZ",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Date => "DATE",
            ColumnType::Uuid => "UUID",
            ColumnType::Json => "JSONB",
        }
    }

    /// The Rust type used for this column in the typed records
    pub fn rust_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "String",
            ColumnType::SmallInt => "i16",
            ColumnType::Integer => "i32",
            ColumnType::BigInt => "i64",
            ColumnType::Numeric => "f64",
            ColumnType::Boolean => "bool",
            ColumnType::Timestamptz => "chrono::DateTime<chrono::Utc>",
            ColumnType::Timestamp => "chrono::NaiveDateTime",
            ColumnType::Date => "chrono::NaiveDate",
            ColumnType::Uuid => "uuid::Uuid",
            ColumnType::Json => "serde_json::Value",
        }
    }

    /// Normalized spelling of a raw SQL type, for reporting types `from_sql` rejects
    pub fn normalize(type_name: &str) -> String {
        normalize_type(type_name)
    }

    /// Serial pseudo-types imply a sequence default
    pub fn is_serial(type_name: &str) -> bool {
        matches!(
            extract_base_type(&normalize_type(type_name)).as_str(),
            "SMALLSERIAL" | "SERIAL" | "BIGSERIAL" | "SERIAL2" | "SERIAL4" | "SERIAL8"
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

fn normalize_type(type_name: &str) -> String {
    let collapsed = type_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
        .replace('"', "");

    let unqualified = collapsed
        .strip_prefix("PG_CATALOG.")
        .or_else(|| collapsed.strip_prefix("PUBLIC."))
        .unwrap_or(&collapsed)
        .to_string();

    unqualified
        .replace("CHARACTER VARYING", "VARCHAR")
        .replace("TIMESTAMP WITHOUT TIME ZONE", "TIMESTAMP")
        .replace("TIMESTAMP WITH TIME ZONE", "TIMESTAMPTZ")
        .replace("TIME WITHOUT TIME ZONE", "TIME")
        .replace("TIME WITH TIME ZONE", "TIMETZ")
}

/// Strip type parameters: `VARCHAR(100)` -> `VARCHAR`
fn extract_base_type(type_name: &str) -> String {
    match type_name.find('(') {
        Some(paren_pos) => type_name[..paren_pos].trim().to_string(),
        None => type_name.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_normalize() {
        assert_eq!(ColumnType::from_sql("int8"), Some(ColumnType::BigInt));
        assert_eq!(ColumnType::from_sql("bigint"), Some(ColumnType::BigInt));
        assert_eq!(ColumnType::from_sql("INT4"), Some(ColumnType::Integer));
        assert_eq!(ColumnType::from_sql("bool"), Some(ColumnType::Boolean));
        assert_eq!(ColumnType::from_sql("boolean"), Some(ColumnType::Boolean));
        assert_eq!(ColumnType::from_sql("character varying(255)"), Some(ColumnType::Text));
        assert_eq!(ColumnType::from_sql("float8"), Some(ColumnType::Numeric));
        assert_eq!(ColumnType::from_sql("numeric(10,2)"), Some(ColumnType::Numeric));
        assert_eq!(ColumnType::from_sql("jsonb"), Some(ColumnType::Json));
    }

    #[test]
    fn test_timestamp_variants() {
        assert_eq!(
            ColumnType::from_sql("timestamp with time zone"),
            Some(ColumnType::Timestamptz)
        );
        assert_eq!(ColumnType::from_sql("timestamptz"), Some(ColumnType::Timestamptz));
        assert_eq!(
            ColumnType::from_sql("timestamp   without time zone"),
            Some(ColumnType::Timestamp)
        );
        assert_eq!(ColumnType::from_sql("date"), Some(ColumnType::Date));
    }

    #[test]
    fn test_qualified_and_unknown_types() {
        assert_eq!(ColumnType::from_sql("pg_catalog.uuid"), Some(ColumnType::Uuid));
        assert_eq!(ColumnType::from_sql("text[]"), None);
        assert_eq!(ColumnType::from_sql("public.hazard_level"), None);
        assert_eq!(ColumnType::normalize("public.hazard_level"), "HAZARD_LEVEL");
    }

    #[test]
    fn test_serial_detection() {
        assert!(ColumnType::is_serial("bigserial"));
        assert!(ColumnType::is_serial("SERIAL"));
        assert!(!ColumnType::is_serial("bigint"));
        assert_eq!(ColumnType::from_sql("bigserial"), Some(ColumnType::BigInt));
    }
}
