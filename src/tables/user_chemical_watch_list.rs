use super::{Nullable, Table};
use crate::schema::{TableDef, USER_CHEMICAL_WATCH_LIST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's watch-list entry for a stocked chemical product
pub struct UserChemicalWatchList;

impl Table for UserChemicalWatchList {
    const NAME: &'static str = "user_chemical_watch_list";

    type Row = UserChemicalWatchListRow;
    type Insert = UserChemicalWatchListInsert;
    type Update = UserChemicalWatchListUpdate;

    fn definition() -> &'static TableDef {
        &USER_CHEMICAL_WATCH_LIST
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserChemicalWatchListRow {
    pub comments_swp: Option<String>,
    pub consequence: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub dangerous_good: Option<bool>,
    pub dangerous_goods_class: Option<String>,
    pub description: Option<String>,
    pub hazardous_substance: Option<bool>,
    pub id: Uuid,
    pub likelihood: Option<String>,
    pub location: Option<String>,
    pub packing_group: Option<String>,
    pub product_id: Option<i64>,
    pub quantity_on_hand: Option<f64>,
    pub risk_rating: Option<String>,
    pub sds_available: Option<bool>,
    pub sds_issue_date: Option<DateTime<Utc>>,
    pub subsidiary_risks: Option<String>,
    pub swp_required: Option<bool>,
    pub user_id: Option<String>,
}

/// Every column is nullable or has a server default, so the empty insert is valid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserChemicalWatchListInsert {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub comments_swp: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub consequence: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub created_at: Nullable<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub dangerous_good: Nullable<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub dangerous_goods_class: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub description: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub hazardous_substance: Nullable<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub likelihood: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub location: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub packing_group: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub product_id: Nullable<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub quantity_on_hand: Nullable<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub risk_rating: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub sds_available: Nullable<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub sds_issue_date: Nullable<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub subsidiary_risks: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub swp_required: Nullable<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub user_id: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserChemicalWatchListUpdate {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub comments_swp: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub consequence: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub created_at: Nullable<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub dangerous_good: Nullable<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub dangerous_goods_class: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub description: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub hazardous_substance: Nullable<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub likelihood: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub location: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub packing_group: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub product_id: Nullable<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub quantity_on_hand: Nullable<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub risk_rating: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub sds_available: Nullable<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub sds_issue_date: Nullable<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub subsidiary_risks: Nullable<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub swp_required: Nullable<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::tables::nullable::deserialize"
    )]
    pub user_id: Nullable<String>,
}

impl UserChemicalWatchListInsert {
    /// A watch-list entry for `product_id` owned by `user_id`
    pub fn for_product(user_id: impl Into<String>, product_id: i64) -> Self {
        Self {
            user_id: Some(Some(user_id.into())),
            product_id: Some(Some(product_id)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::BTreeSet;

    fn keys(value: &Value) -> BTreeSet<String> {
        value.as_object().unwrap().keys().cloned().collect()
    }

    fn sample_row() -> Value {
        json!({
            "comments_swp": null,
            "consequence": "Moderate",
            "created_at": "2025-03-14T02:11:09+00:00",
            "dangerous_good": true,
            "dangerous_goods_class": "5.1",
            "description": "Granular pool chlorine",
            "hazardous_substance": true,
            "id": "8a4f7c1e-3b2d-4e6f-9a8b-1c2d3e4f5a6b",
            "likelihood": "Unlikely",
            "location": "Chemical store B",
            "packing_group": "II",
            "product_id": 42,
            "quantity_on_hand": 12.5,
            "risk_rating": "Medium",
            "sds_available": true,
            "sds_issue_date": "2023-11-01T00:00:00+00:00",
            "subsidiary_risks": null,
            "swp_required": false,
            "user_id": "auth0|5f7c"
        })
    }

    #[test]
    fn test_row_round_trips_postgrest_json() {
        let row: UserChemicalWatchListRow = serde_json::from_value(sample_row()).unwrap();
        assert_eq!(row.product_id, Some(42));
        assert_eq!(row.quantity_on_hand, Some(12.5));
        assert_eq!(
            row.id,
            Uuid::parse_str("8a4f7c1e-3b2d-4e6f-9a8b-1c2d3e4f5a6b").unwrap()
        );

        let value = serde_json::to_value(&row).unwrap();
        let shape: BTreeSet<String> = UserChemicalWatchList::row_shape()
            .field_names()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(keys(&value), shape);
    }

    #[test]
    fn test_row_requires_id() {
        let mut value = sample_row();
        value.as_object_mut().unwrap().remove("id");
        assert!(serde_json::from_value::<UserChemicalWatchListRow>(value).is_err());
    }

    #[test]
    fn test_insert_for_product() {
        let insert = UserChemicalWatchListInsert::for_product("auth0|5f7c", 42);
        assert_eq!(
            serde_json::to_value(&insert).unwrap(),
            json!({"product_id": 42, "user_id": "auth0|5f7c"})
        );
    }

    #[test]
    fn test_update_absent_and_null_differ() {
        let parsed: UserChemicalWatchListUpdate =
            serde_json::from_value(json!({"location": null, "quantity_on_hand": 3})).unwrap();
        assert_eq!(parsed.location, Some(None));
        assert_eq!(parsed.quantity_on_hand, Some(Some(3.0)));
        assert_eq!(parsed.comments_swp, None);

        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value, json!({"location": null, "quantity_on_hand": 3.0}));
    }

    #[test]
    fn test_empty_update_is_empty_object() {
        let update = UserChemicalWatchListUpdate::default();
        assert_eq!(serde_json::to_string(&update).unwrap(), "{}");
    }
}
