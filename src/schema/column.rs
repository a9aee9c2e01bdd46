//! Column definitions and the Row / Insert / Update shapes derived from them

use crate::schema::types::ColumnType;
use serde::Serialize;
use std::fmt;

/// A server-side default for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "expression", rename_all = "snake_case")]
pub enum ColumnDefault {
    /// `DEFAULT <expr>`, e.g. `now()` or `gen_random_uuid()`
    Expression(&'static str),
    /// `GENERATED BY DEFAULT AS IDENTITY` or a serial sequence
    Identity,
}

/// A column as declared in the remote schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
    pub primary_key: bool,
    pub unique: bool,
}

impl ColumnDef {
    /// A nullable column without default
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: true,
            default: None,
            primary_key: false,
            unique: false,
        }
    }

    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn default_expr(mut self, expression: &'static str) -> Self {
        self.default = Some(ColumnDefault::Expression(expression));
        self
    }

    pub const fn identity(mut self) -> Self {
        self.default = Some(ColumnDefault::Identity);
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Which of the three projections of a table a [`Shape`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// What a read returns
    Row,
    /// What a create accepts
    Insert,
    /// What a partial update accepts
    Update,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Row, ShapeKind::Insert, ShapeKind::Update];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "row" => Some(ShapeKind::Row),
            "insert" => Some(ShapeKind::Insert),
            "update" => Some(ShapeKind::Update),
            _ => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Row => write!(f, "Row"),
            ShapeKind::Insert => write!(f, "Insert"),
            ShapeKind::Update => write!(f, "Update"),
        }
    }
}

/// One field of a shape.
///
/// `required` means the field must be present with a non-null value;
/// `nullable` means `null` is an accepted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldShape {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub required: bool,
    pub nullable: bool,
}

impl FieldShape {
    pub fn for_column(column: &ColumnDef, kind: ShapeKind) -> Self {
        let required = match kind {
            ShapeKind::Row => !column.nullable,
            ShapeKind::Insert => !column.nullable && !column.has_default(),
            ShapeKind::Update => false,
        };

        Self {
            name: column.name,
            column_type: column.column_type,
            required,
            nullable: column.nullable,
        }
    }
}

/// The field set of one projection of a table or view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub schema: &'static str,
    pub relation: &'static str,
    pub kind: ShapeKind,
    pub fields: Vec<FieldShape>,
}

impl Shape {
    pub fn from_columns(
        schema: &'static str,
        relation: &'static str,
        kind: ShapeKind,
        columns: &[ColumnDef],
    ) -> Self {
        Self {
            schema,
            relation,
            kind,
            fields: columns
                .iter()
                .map(|column| FieldShape::for_column(column, kind))
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields.iter().filter(|f| f.required).map(|f| f.name).collect()
    }

    pub fn optional_fields(&self) -> Vec<&'static str> {
        self.fields.iter().filter(|f| !f.required).map(|f| f.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: [ColumnDef; 3] = [
        ColumnDef::new("id", ColumnType::BigInt).primary_key().identity(),
        ColumnDef::new("sku", ColumnType::Text).not_null().unique(),
        ColumnDef::new("note", ColumnType::Text),
    ];

    #[test]
    fn test_builder_flags() {
        let id = COLUMNS[0];
        assert!(id.primary_key);
        assert!(!id.nullable);
        assert_eq!(id.default, Some(ColumnDefault::Identity));

        let sku = COLUMNS[1];
        assert!(sku.unique);
        assert!(!sku.has_default());
    }

    #[test]
    fn test_row_requires_non_null_columns() {
        let shape = Shape::from_columns("public", "items", ShapeKind::Row, &COLUMNS);
        assert_eq!(shape.required_fields(), vec!["id", "sku"]);
        assert_eq!(shape.optional_fields(), vec!["note"]);
    }

    #[test]
    fn test_insert_relaxes_defaulted_columns() {
        let shape = Shape::from_columns("public", "items", ShapeKind::Insert, &COLUMNS);
        assert_eq!(shape.required_fields(), vec!["sku"]);
        let id = shape.field("id").unwrap();
        assert!(!id.required);
        assert!(!id.nullable);
    }

    #[test]
    fn test_update_has_no_required_fields() {
        let shape = Shape::from_columns("public", "items", ShapeKind::Update, &COLUMNS);
        assert!(shape.required_fields().is_empty());
        assert_eq!(shape.field_names(), vec!["id", "sku", "note"]);
    }

    #[test]
    fn test_shape_kind_parse() {
        assert_eq!(ShapeKind::parse("Insert"), Some(ShapeKind::Insert));
        assert_eq!(ShapeKind::parse(" row "), Some(ShapeKind::Row));
        assert_eq!(ShapeKind::parse("delete"), None);
        assert_eq!(ShapeKind::Update.to_string(), "Update");
    }
}
