//! Schema registry
//!
//! Static description of the remote database plus the tooling that keeps it
//! honest:
//! - [`catalog`]: the registry model and its lookups
//! - [`public`]: the generated `public` schema
//! - [`verifier`]: internal consistency checks of a registry
//! - [`ddl`] and [`diff`]: drift detection against a DDL dump

pub mod catalog;
pub mod column;
pub mod ddl;
pub mod diff;
pub mod public;
pub mod types;
pub mod verifier;

pub use catalog::{
    CompositeTypeDef, Database, EnumDef, FunctionDef, ObjectRef, Relationship, SchemaConstants,
    SchemaDef, TableDef, ViewDef, DEFAULT_SCHEMA,
};
pub use column::{ColumnDef, ColumnDefault, FieldShape, Shape, ShapeKind};
pub use ddl::{DdlColumn, DdlForeignKey, DdlParser, DdlTable};
pub use diff::{DriftChange, DriftChecker, DriftKind, SchemaDrift};
pub use public::{DATABASE, POSTGREST_VERSION, PRODUCT, PUBLIC, USER_CHEMICAL_WATCH_LIST};
pub use types::ColumnType;
pub use verifier::{SchemaVerifier, ShapeMismatch, VerificationResult};
