//! Typed records
//!
//! One Row / Insert / Update struct per table, tied to the registry through
//! the [`Table`] trait. Field names serialize exactly as the column names, so
//! the records can be sent to and read from PostgREST as-is.

pub mod nullable;
mod product;
mod user_chemical_watch_list;

pub use nullable::Nullable;
pub use product::{Product, ProductInsert, ProductRow, ProductUpdate};
pub use user_chemical_watch_list::{
    UserChemicalWatchList, UserChemicalWatchListInsert, UserChemicalWatchListRow,
    UserChemicalWatchListUpdate,
};

use crate::schema::{Relationship, Shape, ShapeKind, TableDef, DEFAULT_SCHEMA};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A table of the registry together with its record types
pub trait Table {
    const SCHEMA: &'static str = DEFAULT_SCHEMA;
    const NAME: &'static str;

    type Row: Serialize + DeserializeOwned;
    type Insert: Serialize + DeserializeOwned;
    type Update: Serialize + DeserializeOwned + Default;

    fn definition() -> &'static TableDef;

    fn row_shape() -> Shape {
        Self::definition().shape(Self::SCHEMA, ShapeKind::Row)
    }

    fn insert_shape() -> Shape {
        Self::definition().shape(Self::SCHEMA, ShapeKind::Insert)
    }

    fn update_shape() -> Shape {
        Self::definition().shape(Self::SCHEMA, ShapeKind::Update)
    }

    fn relationships() -> &'static [Relationship] {
        Self::definition().relationships
    }
}

/// What a read of `T` returns
pub type Row<T> = <T as Table>::Row;

/// What a create on `T` accepts
pub type Insert<T> = <T as Table>::Insert;

/// What a partial update of `T` accepts
pub type Update<T> = <T as Table>::Update;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DATABASE;

    fn assert_registered<T: Table>() {
        let table = DATABASE
            .table((T::SCHEMA, T::NAME))
            .expect("table is registered");
        assert!(std::ptr::eq(table, T::definition()));
    }

    #[test]
    fn test_record_types_match_registry() {
        assert_registered::<Product>();
        assert_registered::<UserChemicalWatchList>();
    }

    #[test]
    fn test_projection_aliases() {
        let update: Update<Product> = Default::default();
        assert_eq!(serde_json::to_string(&update).unwrap(), "{}");

        let insert: Insert<UserChemicalWatchList> = Default::default();
        assert_eq!(serde_json::to_string(&insert).unwrap(), "{}");

        let row: Row<Product> = serde_json::from_str(r#"{"barcode": "9300633", "id": 1}"#).unwrap();
        assert_eq!(row.id, 1);
    }

    #[test]
    fn test_relationships_through_trait() {
        assert!(Product::relationships().is_empty());
        let fk = &UserChemicalWatchList::relationships()[0];
        assert_eq!(fk.referenced_relation, Product::NAME);
    }
}
