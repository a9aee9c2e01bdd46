//! Schema Drift Checker
//!
//! Compares the registry against table definitions parsed from the live
//! schema's DDL. Any difference means the registry is stale and must be
//! regenerated.
//!
//! Flow:
//! 1. Parse the remote DDL with [`DdlParser`](crate::schema::DdlParser)
//! 2. Keep only tables of the schema being checked
//! 3. Compare tables, columns and relationships
//! 4. Report every difference, sorted by table and column

use crate::schema::catalog::{Relationship, SchemaDef, TableDef};
use crate::schema::column::ColumnDef;
use crate::schema::ddl::{DdlColumn, DdlForeignKey, DdlTable};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DriftKind {
    TableMissingFromRegistry,
    TableMissingFromDatabase,
    ColumnMissingFromRegistry,
    ColumnMissingFromDatabase,
    TypeChanged,
    NullabilityChanged,
    DefaultChanged,
    RelationshipMissingFromRegistry,
    RelationshipMissingFromDatabase,
    RelationshipChanged,
}

/// A single difference between registry and database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftChange {
    pub table: String,
    pub kind: DriftKind,
    /// Column or foreign key name the change applies to
    pub object: Option<String>,
    pub registry: Option<String>,
    pub database: Option<String>,
}

/// Result of a drift check
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDrift {
    pub schema: String,
    pub changes: Vec<DriftChange>,
}

impl SchemaDrift {
    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            changes: Vec::new(),
        }
    }

    pub fn in_sync(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn add_change(
        &mut self,
        table: &str,
        kind: DriftKind,
        object: Option<&str>,
        registry: Option<String>,
        database: Option<String>,
    ) {
        self.changes.push(DriftChange {
            table: table.to_string(),
            kind,
            object: object.map(String::from),
            registry,
            database,
        });
    }

    pub fn changes_for(&self, table: &str) -> Vec<&DriftChange> {
        self.changes.iter().filter(|c| c.table == table).collect()
    }

    /// Format drift as readable string
    pub fn format_drift(&self) -> String {
        let mut output = String::new();

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                     SCHEMA DRIFT REPORT\n");
        output.push_str("═══════════════════════════════════════════════════════════════\n\n");

        output.push_str(&format!("Schema: {}\n\n", self.schema));

        if self.in_sync() {
            output.push_str("Registry matches the database schema.\n");
            return output;
        }

        let mut by_table: BTreeMap<&str, Vec<&DriftChange>> = BTreeMap::new();
        for change in &self.changes {
            by_table.entry(change.table.as_str()).or_default().push(change);
        }

        output.push_str(&format!("DIFFERENCES ({}):\n", self.changes.len()));
        output.push_str("───────────────────────────────────────────────────────────────\n");
        for (table, changes) in by_table {
            output.push_str(&format!("  {}:\n", table));
            for change in changes {
                output.push_str(&Self::format_change(change));
            }
        }
        output.push('\n');

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("Result: DRIFT - Regenerate the registry from the remote schema\n");

        output
    }

    fn format_change(change: &DriftChange) -> String {
        let mut line = format!("    • {:?}", change.kind);

        if let Some(object) = &change.object {
            line.push_str(&format!(" {}", object));
        }

        match (&change.registry, &change.database) {
            (Some(registry), Some(database)) => {
                line.push_str(&format!(": registry {} / database {}", registry, database))
            }
            (Some(registry), None) => line.push_str(&format!(": registry {}", registry)),
            (None, Some(database)) => line.push_str(&format!(": database {}", database)),
            (None, None) => {}
        }

        line.push('\n');
        line
    }
}

pub struct DriftChecker;

impl DriftChecker {
    pub fn new() -> Self {
        Self
    }

    /// Compare one registry schema against parsed DDL tables
    pub fn compare(&self, schema: &SchemaDef, ddl_tables: &[DdlTable]) -> SchemaDrift {
        let mut drift = SchemaDrift::new(schema.name);

        let database: BTreeMap<&str, &DdlTable> = ddl_tables
            .iter()
            .filter(|t| t.schema == schema.name)
            .map(|t| (t.name.as_str(), t))
            .collect();

        debug!(
            "Comparing {} registry tables against {} parsed tables in schema {}",
            schema.tables.len(),
            database.len(),
            schema.name
        );

        for table in schema.tables {
            match database.get(table.name) {
                None => drift.add_change(
                    table.name,
                    DriftKind::TableMissingFromDatabase,
                    None,
                    None,
                    None,
                ),
                Some(ddl_table) => self.compare_table(&mut drift, table, ddl_table),
            }
        }

        for name in database.keys() {
            if schema.table(name).is_none() {
                drift.add_change(name, DriftKind::TableMissingFromRegistry, None, None, None);
            }
        }

        drift
            .changes
            .sort_by(|a, b| (&a.table, &a.object, a.kind).cmp(&(&b.table, &b.object, b.kind)));

        if drift.in_sync() {
            info!("Registry schema {} is in sync", schema.name);
        } else {
            warn!(
                "Registry schema {} drifted: {} differences",
                schema.name,
                drift.changes.len()
            );
        }

        drift
    }

    fn compare_table(&self, drift: &mut SchemaDrift, table: &TableDef, ddl_table: &DdlTable) {
        for column in table.columns {
            match ddl_table.column(column.name) {
                None => drift.add_change(
                    table.name,
                    DriftKind::ColumnMissingFromDatabase,
                    Some(column.name),
                    Some(column.column_type.to_string()),
                    None,
                ),
                Some(ddl_column) => self.compare_column(drift, table.name, column, ddl_column),
            }
        }

        for ddl_column in &ddl_table.columns {
            if table.column(&ddl_column.name).is_none() {
                drift.add_change(
                    table.name,
                    DriftKind::ColumnMissingFromRegistry,
                    Some(ddl_column.name.as_str()),
                    None,
                    Some(ddl_column.data_type.clone()),
                );
            }
        }

        self.compare_relationships(drift, table, ddl_table);
    }

    fn compare_column(&self, drift: &mut SchemaDrift, table: &str, column: &ColumnDef, ddl_column: &DdlColumn) {
        if ddl_column.column_type != Some(column.column_type) {
            drift.add_change(
                table,
                DriftKind::TypeChanged,
                Some(column.name),
                Some(column.column_type.to_string()),
                Some(ddl_column.data_type.clone()),
            );
        }

        if ddl_column.nullable != column.nullable {
            drift.add_change(
                table,
                DriftKind::NullabilityChanged,
                Some(column.name),
                Some(nullability(column.nullable)),
                Some(nullability(ddl_column.nullable)),
            );
        }

        // only the presence of a default changes the Insert shape
        if ddl_column.has_default() != column.has_default() {
            drift.add_change(
                table,
                DriftKind::DefaultChanged,
                Some(column.name),
                Some(default_label(column.has_default())),
                Some(default_label(ddl_column.has_default())),
            );
        }
    }

    fn compare_relationships(&self, drift: &mut SchemaDrift, table: &TableDef, ddl_table: &DdlTable) {
        for rel in table.relationships {
            match ddl_table.foreign_keys.iter().find(|fk| same_target(rel, fk)) {
                None => drift.add_change(
                    table.name,
                    DriftKind::RelationshipMissingFromDatabase,
                    Some(rel.foreign_key_name),
                    Some(describe_relationship(rel)),
                    None,
                ),
                Some(fk) => {
                    let one_to_one = ddl_table.is_one_to_one(fk);
                    if fk.name != rel.foreign_key_name || one_to_one != rel.is_one_to_one {
                        drift.add_change(
                            table.name,
                            DriftKind::RelationshipChanged,
                            Some(rel.foreign_key_name),
                            Some(format!("{} one_to_one={}", rel.foreign_key_name, rel.is_one_to_one)),
                            Some(format!("{} one_to_one={}", fk.name, one_to_one)),
                        );
                    }
                }
            }
        }

        for fk in &ddl_table.foreign_keys {
            if !table.relationships.iter().any(|rel| same_target(rel, fk)) {
                drift.add_change(
                    table.name,
                    DriftKind::RelationshipMissingFromRegistry,
                    Some(fk.name.as_str()),
                    None,
                    Some(describe_foreign_key(fk)),
                );
            }
        }
    }
}

impl Default for DriftChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn same_target(rel: &Relationship, fk: &DdlForeignKey) -> bool {
    rel.referenced_relation == fk.referenced_table
        && rel.columns.iter().copied().eq(fk.columns.iter().map(String::as_str))
        && rel
            .referenced_columns
            .iter()
            .copied()
            .eq(fk.referenced_columns.iter().map(String::as_str))
}

fn describe_relationship(rel: &Relationship) -> String {
    format!(
        "({}) -> {}({})",
        rel.columns.join(", "),
        rel.referenced_relation,
        rel.referenced_columns.join(", ")
    )
}

fn describe_foreign_key(fk: &DdlForeignKey) -> String {
    format!(
        "({}) -> {}({})",
        fk.columns.join(", "),
        fk.referenced_table,
        fk.referenced_columns.join(", ")
    )
}

fn nullability(nullable: bool) -> String {
    let label = if nullable { "NULLABLE" } else { "NOT NULL" };
    label.to_string()
}

fn default_label(has_default: bool) -> String {
    let label = if has_default { "DEFAULT" } else { "NO DEFAULT" };
    label.to_string()
}
