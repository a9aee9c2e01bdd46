//! Chemwatch Schema Library
//!
//! Typed description of the chemical watch-list database as exposed through
//! PostgREST: the schema registry, typed records for each table, and tooling
//! to detect when the registry has drifted from the live schema.

pub mod config;
pub mod error;
pub mod logging;
pub mod schema;
pub mod tables;

pub use error::{Result, SchemaError};
pub use schema::{Database, ObjectRef, Shape, ShapeKind, DATABASE};
pub use tables::{Insert, Product, Row, Table, Update, UserChemicalWatchList};

/// Arbitrary JSON value, for `json` / `jsonb` columns
pub type Json = serde_json::Value;
