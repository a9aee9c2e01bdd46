use super::{Nullable, Table};
use crate::schema::{TableDef, PRODUCT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The product catalogue, keyed by an identity `id` and a unique `barcode`
pub struct Product;

impl Table for Product {
    const NAME: &'static str = "product";

    type Row = ProductRow;
    type Insert = ProductInsert;
    type Update = ProductUpdate;

    fn definition() -> &'static TableDef {
        &PRODUCT
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    pub barcode: String,
    pub contents_size_weight: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub id: i64,
    pub manufacturer: Option<String>,
    pub name: Option<String>,
    pub sds_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInsert {
    pub barcode: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub contents_size_weight: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub created_at: Nullable<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub manufacturer: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub name: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub sds_url: Nullable<String>,
}

impl ProductInsert {
    /// An insert carrying only the barcode; everything else is left to the server
    pub fn new(barcode: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
            contents_size_weight: None,
            created_at: None,
            id: None,
            manufacturer: None,
            name: None,
            sds_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub contents_size_weight: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub created_at: Nullable<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub manufacturer: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub name: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub sds_url: Nullable<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::BTreeSet;

    fn keys(value: &Value) -> BTreeSet<String> {
        value.as_object().unwrap().keys().cloned().collect()
    }

    fn shape_names(names: Vec<&'static str>) -> BTreeSet<String> {
        names.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_row_keys_match_row_shape() {
        let row: ProductRow = serde_json::from_value(json!({
            "barcode": "9300633603294",
            "contents_size_weight": "500 mL",
            "created_at": "2025-03-14T02:11:09.123456+00:00",
            "id": 42,
            "manufacturer": null,
            "name": "Pool Chlorine",
            "sds_url": null
        }))
        .unwrap();

        assert_eq!(row.id, 42);
        assert!(row.manufacturer.is_none());
        assert!(row.created_at.is_some());

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(keys(&value), shape_names(Product::row_shape().field_names()));
    }

    #[test]
    fn test_insert_sends_only_what_is_set() {
        let insert = ProductInsert::new("9300633603294");
        assert_eq!(serde_json::to_value(&insert).unwrap(), json!({"barcode": "9300633603294"}));

        let insert = ProductInsert {
            name: Some(Some("Pool Chlorine".to_string())),
            sds_url: Some(None),
            ..ProductInsert::new("9300633603294")
        };
        assert_eq!(
            serde_json::to_value(&insert).unwrap(),
            json!({"barcode": "9300633603294", "name": "Pool Chlorine", "sds_url": null})
        );
    }

    #[test]
    fn test_insert_requires_barcode() {
        let err = serde_json::from_value::<ProductInsert>(json!({"name": "Bleach"}));
        assert!(err.is_err());
        assert_eq!(Product::insert_shape().required_fields(), vec!["barcode"]);
    }

    #[test]
    fn test_empty_update_is_empty_object() {
        let update = ProductUpdate::default();
        assert_eq!(serde_json::to_string(&update).unwrap(), "{}");
    }

    #[test]
    fn test_update_keeps_explicit_null() {
        let update = ProductUpdate {
            manufacturer: Some(None),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"manufacturer": null}));

        let parsed: ProductUpdate =
            serde_json::from_value(json!({"manufacturer": null, "name": "Bleach"})).unwrap();
        assert_eq!(parsed.manufacturer, Some(None));
        assert_eq!(parsed.name, Some(Some("Bleach".to_string())));
        assert_eq!(parsed.sds_url, None);
        assert_eq!(parsed, ProductUpdate {
            manufacturer: Some(None),
            name: Some(Some("Bleach".to_string())),
            ..Default::default()
        });
    }

    #[test]
    fn test_update_fields_cover_row_fields() {
        let update = ProductUpdate {
            barcode: Some("1".to_string()),
            contents_size_weight: Some(None),
            created_at: Some(None),
            id: Some(1),
            manufacturer: Some(None),
            name: Some(None),
            sds_url: Some(None),
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(keys(&value), shape_names(Product::update_shape().field_names()));
    }
}
