use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema not found: {schema}")]
    UnknownSchema { schema: String },

    #[error("Table not found: {schema}.{table}")]
    UnknownTable { schema: String, table: String },

    #[error("DDL parsing failed: {cause}")]
    DdlParseFailed { cause: String },

    #[error("IO error on {path}: {cause}")]
    Io { path: String, cause: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable form of a [`SchemaError`], printed by the CLI tools
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl SchemaError {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownSchema { .. } => "unknown_schema",
            SchemaError::UnknownTable { .. } => "unknown_table",
            SchemaError::DdlParseFailed { .. } => "ddl_parse_failed",
            SchemaError::Io { .. } => "io_error",
            SchemaError::Serialization(_) => "serialization_failed",
            SchemaError::Internal(_) => "internal_error",
        }
    }

    pub fn report(&self) -> ErrorReport {
        match self {
            SchemaError::UnknownSchema { schema } => ErrorReport {
                error: self.code().to_string(),
                message: format!("Schema '{}' is not part of the registry", schema),
                schema: Some(schema.clone()),
                cause: None,
            },
            SchemaError::UnknownTable { schema, table } => ErrorReport {
                error: self.code().to_string(),
                message: format!("Table '{}' is not defined in schema '{}'", table, schema),
                schema: Some(schema.clone()),
                cause: None,
            },
            SchemaError::DdlParseFailed { cause } => ErrorReport {
                error: self.code().to_string(),
                message: "Failed to parse schema DDL".to_string(),
                schema: None,
                cause: Some(cause.clone()),
            },
            SchemaError::Io { path, cause } => ErrorReport {
                error: self.code().to_string(),
                message: format!("Failed to read '{}'", path),
                schema: None,
                cause: Some(cause.clone()),
            },
            SchemaError::Serialization(msg) | SchemaError::Internal(msg) => ErrorReport {
                error: self.code().to_string(),
                message: msg.clone(),
                schema: None,
                cause: None,
            },
        }
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(err: std::io::Error) -> Self {
        SchemaError::Io {
            path: "<unknown>".to_string(),
            cause: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for SchemaError {
    fn from(err: anyhow::Error) -> Self {
        SchemaError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
