//! Schema catalog
//!
//! Static description of a database: schemas, their tables, views, stored
//! functions, enums and composite types. Lookups resolve a name to a shape or
//! definition; an unknown schema or name resolves to `None`.

use crate::error::{Result, SchemaError};
use crate::schema::column::{ColumnDef, Shape, ShapeKind};
use crate::schema::types::ColumnType;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Schema used when a lookup does not name one
pub const DEFAULT_SCHEMA: &str = "public";

/// A foreign key from a table to another relation, used for join inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub foreign_key_name: &'static str,
    pub columns: &'static [&'static str],
    pub is_one_to_one: bool,
    pub referenced_relation: &'static str,
    pub referenced_columns: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub relationships: &'static [Relationship],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name)
            .collect()
    }

    pub fn shape(&self, schema: &'static str, kind: ShapeKind) -> Shape {
        Shape::from_columns(schema, self.name, kind, self.columns)
    }
}

/// Views are read-only: they only have a Row shape
#[derive(Debug, Serialize)]
pub struct ViewDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

#[derive(Debug, Serialize)]
pub struct FunctionDef {
    pub name: &'static str,
    pub args: &'static [ColumnDef],
    /// `None` for functions returning `void`
    pub returns: Option<ColumnType>,
}

#[derive(Debug, Serialize)]
pub struct EnumDef {
    pub name: &'static str,
    pub values: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct CompositeTypeDef {
    pub name: &'static str,
    pub attributes: &'static [ColumnDef],
}

#[derive(Debug, Serialize)]
pub struct SchemaDef {
    pub name: &'static str,
    pub tables: &'static [&'static TableDef],
    pub views: &'static [ViewDef],
    pub functions: &'static [FunctionDef],
    pub enums: &'static [EnumDef],
    pub composite_types: &'static [CompositeTypeDef],
}

impl SchemaDef {
    pub fn table(&self, name: &str) -> Option<&'static TableDef> {
        self.tables.iter().copied().find(|t| t.name == name)
    }

    pub fn view(&self, name: &str) -> Option<&'static ViewDef> {
        self.views.iter().find(|v| v.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&'static FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn enum_values(&self, name: &str) -> Option<&'static [&'static str]> {
        self.enums.iter().find(|e| e.name == name).map(|e| e.values)
    }

    pub fn composite_type(&self, name: &str) -> Option<&'static CompositeTypeDef> {
        self.composite_types.iter().find(|c| c.name == name)
    }

    pub fn table_names(&self) -> Vec<&'static str> {
        self.tables.iter().map(|t| t.name).collect()
    }

    /// Row shape of a table or, failing that, a view
    pub fn row_shape(&self, name: &str) -> Option<Shape> {
        if let Some(table) = self.table(name) {
            return Some(table.shape(self.name, ShapeKind::Row));
        }
        self.view(name)
            .map(|view| Shape::from_columns(self.name, view.name, ShapeKind::Row, view.columns))
    }

    pub fn insert_shape(&self, name: &str) -> Option<Shape> {
        self.table(name)
            .map(|table| table.shape(self.name, ShapeKind::Insert))
    }

    pub fn update_shape(&self, name: &str) -> Option<Shape> {
        self.table(name)
            .map(|table| table.shape(self.name, ShapeKind::Update))
    }

    pub fn shape(&self, name: &str, kind: ShapeKind) -> Option<Shape> {
        match kind {
            ShapeKind::Row => self.row_shape(name),
            ShapeKind::Insert => self.insert_shape(name),
            ShapeKind::Update => self.update_shape(name),
        }
    }
}

/// Name of a schema object, either in the default schema or scoped explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRef<'a> {
    Default(&'a str),
    Scoped { schema: &'a str, name: &'a str },
}

impl<'a> ObjectRef<'a> {
    pub fn scoped(schema: &'a str, name: &'a str) -> Self {
        ObjectRef::Scoped { schema, name }
    }

    pub fn schema(&self) -> &'a str {
        match *self {
            ObjectRef::Default(_) => DEFAULT_SCHEMA,
            ObjectRef::Scoped { schema, .. } => schema,
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            ObjectRef::Default(name) => name,
            ObjectRef::Scoped { name, .. } => name,
        }
    }
}

impl<'a> From<&'a str> for ObjectRef<'a> {
    fn from(name: &'a str) -> Self {
        ObjectRef::Default(name)
    }
}

impl<'a> From<(&'a str, &'a str)> for ObjectRef<'a> {
    fn from((schema, name): (&'a str, &'a str)) -> Self {
        ObjectRef::Scoped { schema, name }
    }
}

/// Enum value lists of one schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaConstants {
    pub enums: BTreeMap<&'static str, &'static [&'static str]>,
}

/// The whole database description
#[derive(Debug, Serialize)]
pub struct Database {
    /// PostgREST version the description was generated against
    pub postgrest_version: &'static str,
    pub schemas: &'static [&'static SchemaDef],
}

impl Database {
    pub fn schema(&self, name: &str) -> Option<&'static SchemaDef> {
        self.schemas.iter().copied().find(|s| s.name == name)
    }

    pub fn schema_names(&self) -> Vec<&'static str> {
        self.schemas.iter().map(|s| s.name).collect()
    }

    pub fn table<'a>(&self, object: impl Into<ObjectRef<'a>>) -> Option<&'static TableDef> {
        let object = object.into();
        self.schema(object.schema())?.table(object.name())
    }

    pub fn require_schema(&self, name: &str) -> Result<&'static SchemaDef> {
        self.schema(name).ok_or_else(|| SchemaError::UnknownSchema {
            schema: name.to_string(),
        })
    }

    /// Like [`Database::table`], but reports what was missing
    pub fn require_table<'a>(&self, object: impl Into<ObjectRef<'a>>) -> Result<&'static TableDef> {
        let object = object.into();
        self.require_schema(object.schema())?
            .table(object.name())
            .ok_or_else(|| SchemaError::UnknownTable {
                schema: object.schema().to_string(),
                table: object.name().to_string(),
            })
    }

    pub fn row_shape<'a>(&self, object: impl Into<ObjectRef<'a>>) -> Option<Shape> {
        let object = object.into();
        self.schema(object.schema())?.row_shape(object.name())
    }

    pub fn insert_shape<'a>(&self, object: impl Into<ObjectRef<'a>>) -> Option<Shape> {
        let object = object.into();
        self.schema(object.schema())?.insert_shape(object.name())
    }

    pub fn update_shape<'a>(&self, object: impl Into<ObjectRef<'a>>) -> Option<Shape> {
        let object = object.into();
        self.schema(object.schema())?.update_shape(object.name())
    }

    pub fn shape<'a>(&self, object: impl Into<ObjectRef<'a>>, kind: ShapeKind) -> Option<Shape> {
        let object = object.into();
        self.schema(object.schema())?.shape(object.name(), kind)
    }

    pub fn relationships<'a>(
        &self,
        object: impl Into<ObjectRef<'a>>,
    ) -> Option<&'static [Relationship]> {
        self.table(object).map(|t| t.relationships)
    }

    pub fn enum_values<'a>(
        &self,
        object: impl Into<ObjectRef<'a>>,
    ) -> Option<&'static [&'static str]> {
        let object = object.into();
        self.schema(object.schema())?.enum_values(object.name())
    }

    pub fn composite_type<'a>(
        &self,
        object: impl Into<ObjectRef<'a>>,
    ) -> Option<&'static CompositeTypeDef> {
        let object = object.into();
        self.schema(object.schema())?.composite_type(object.name())
    }

    /// Enum value lists keyed by schema, then enum name
    pub fn constants(&self) -> BTreeMap<&'static str, SchemaConstants> {
        self.schemas
            .iter()
            .map(|schema| {
                let enums = schema.enums.iter().map(|e| (e.name, e.values)).collect();
                (schema.name, SchemaConstants { enums })
            })
            .collect()
    }

    /// Hex SHA-256 of the canonical JSON description
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(hex::encode(hasher.finalize()))
    }
}
