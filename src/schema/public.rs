//! The `public` schema of the chemical watch-list database.
//!
//! Mirrors the remote schema; regenerate it from the database whenever the
//! remote schema changes (`schema-drift` reports when that is due).

use crate::schema::catalog::{Database, Relationship, SchemaDef, TableDef};
use crate::schema::column::ColumnDef;
use crate::schema::types::ColumnType;

pub const POSTGREST_VERSION: &str = "12.2.12 (cd3cf9e)";

pub static PRODUCT: TableDef = TableDef {
    name: "product",
    columns: &[
        ColumnDef::new("barcode", ColumnType::Text).not_null().unique(),
        ColumnDef::new("contents_size_weight", ColumnType::Text),
        ColumnDef::new("created_at", ColumnType::Timestamptz).default_expr("now()"),
        ColumnDef::new("id", ColumnType::BigInt).primary_key().identity(),
        ColumnDef::new("manufacturer", ColumnType::Text),
        ColumnDef::new("name", ColumnType::Text),
        ColumnDef::new("sds_url", ColumnType::Text),
    ],
    relationships: &[],
};

pub static USER_CHEMICAL_WATCH_LIST: TableDef = TableDef {
    name: "user_chemical_watch_list",
    columns: &[
        ColumnDef::new("comments_swp", ColumnType::Text),
        ColumnDef::new("consequence", ColumnType::Text),
        ColumnDef::new("created_at", ColumnType::Timestamptz).default_expr("now()"),
        ColumnDef::new("dangerous_good", ColumnType::Boolean),
        ColumnDef::new("dangerous_goods_class", ColumnType::Text),
        ColumnDef::new("description", ColumnType::Text),
        ColumnDef::new("hazardous_substance", ColumnType::Boolean),
        ColumnDef::new("id", ColumnType::Uuid)
            .primary_key()
            .default_expr("gen_random_uuid()"),
        ColumnDef::new("likelihood", ColumnType::Text),
        ColumnDef::new("location", ColumnType::Text),
        ColumnDef::new("packing_group", ColumnType::Text),
        ColumnDef::new("product_id", ColumnType::BigInt),
        ColumnDef::new("quantity_on_hand", ColumnType::Numeric),
        ColumnDef::new("risk_rating", ColumnType::Text),
        ColumnDef::new("sds_available", ColumnType::Boolean),
        ColumnDef::new("sds_issue_date", ColumnType::Timestamptz),
        ColumnDef::new("subsidiary_risks", ColumnType::Text),
        ColumnDef::new("swp_required", ColumnType::Boolean),
        ColumnDef::new("user_id", ColumnType::Text),
    ],
    relationships: &[Relationship {
        foreign_key_name: "user_chemical_watch_list_product_id_fkey",
        columns: &["product_id"],
        is_one_to_one: false,
        referenced_relation: "product",
        referenced_columns: &["id"],
    }],
};

pub static PUBLIC: SchemaDef = SchemaDef {
    name: "public",
    tables: &[&PRODUCT, &USER_CHEMICAL_WATCH_LIST],
    views: &[],
    functions: &[],
    enums: &[],
    composite_types: &[],
};

pub static DATABASE: Database = Database {
    postgrest_version: POSTGREST_VERSION,
    schemas: &[&PUBLIC],
};
