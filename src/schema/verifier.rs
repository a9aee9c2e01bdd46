//! Schema Verifier
//!
//! Checks a catalog against the invariants the typed query layer relies on:
//! - Column names are unique per relation
//! - Every relationship points at existing columns of matching type
//!
//! Shapes are derived from the columns, so their rules hold by construction.
//! [`SchemaVerifier::verify_records`] checks the hand-written typed records
//! against those shapes instead:
//! - an Insert record accepts `{}` exactly when nothing is required
//! - an empty Update record serializes to `{}`
//! - an Update record keeps an explicit `null` for every nullable column

use crate::schema::catalog::{Database, SchemaDef, TableDef};
use crate::tables::Table;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// A single invariant violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeMismatch {
    pub schema: String,
    pub table: String,
    pub issue: String,
}

/// Result of verifying a catalog
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub tables_checked: usize,
    pub mismatches: Vec<ShapeMismatch>,
}

impl VerificationResult {
    pub fn new() -> Self {
        Self {
            passed: true,
            tables_checked: 0,
            mismatches: Vec::new(),
        }
    }

    pub fn add_mismatch(&mut self, schema: &str, table: &str, issue: String) {
        warn!("Schema mismatch in {}.{}: {}", schema, table, issue);
        self.passed = false;
        self.mismatches.push(ShapeMismatch {
            schema: schema.to_string(),
            table: table.to_string(),
            issue,
        });
    }

    /// Generate a human-readable error log
    pub fn error_log(&self) -> String {
        let mut log = String::new();

        log.push_str("═══════════════════════════════════════════════════════════════\n");
        if self.passed {
            log.push_str("              SCHEMA VERIFICATION PASSED\n");
        } else {
            log.push_str("              SCHEMA VERIFICATION FAILED\n");
        }
        log.push_str("═══════════════════════════════════════════════════════════════\n\n");

        log.push_str(&format!("Tables checked: {}\n\n", self.tables_checked));

        if !self.mismatches.is_empty() {
            log.push_str("SHAPE MISMATCHES:\n");
            for m in &self.mismatches {
                log.push_str(&format!("  - {}.{}: {}\n", m.schema, m.table, m.issue));
            }
            log.push('\n');
            log.push_str("═══════════════════════════════════════════════════════════════\n");
            log.push_str("ACTION REQUIRED: Regenerate the registry from the remote schema\n");
        }

        log.push_str("═══════════════════════════════════════════════════════════════\n");

        log
    }
}

impl Default for VerificationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SchemaVerifier;

impl SchemaVerifier {
    pub fn new() -> Self {
        Self
    }

    pub fn verify(&self, database: &Database) -> VerificationResult {
        let mut result = VerificationResult::new();

        for schema in database.schemas {
            self.verify_schema(schema, &mut result);
        }

        if result.passed {
            info!(
                "Schema verification passed for {} tables",
                result.tables_checked
            );
        } else {
            warn!(
                "Schema verification found {} mismatches",
                result.mismatches.len()
            );
        }

        result
    }

    pub fn verify_schema(&self, schema: &SchemaDef, result: &mut VerificationResult) {
        for table in schema.tables {
            debug!("Verifying {}.{}", schema.name, table.name);
            result.tables_checked += 1;

            self.check_unique_columns(schema, table, result);
            self.check_relationships(schema, table, result);
        }
    }

    /// Check the typed records of `T` against its registry shapes
    pub fn verify_records<T: Table>(&self, result: &mut VerificationResult) {
        debug!("Verifying records of {}.{}", T::SCHEMA, T::NAME);
        self.check_insert_record::<T>(result);
        self.check_update_record::<T>(result);
    }

    fn check_insert_record<T: Table>(&self, result: &mut VerificationResult) {
        let required = T::insert_shape().required_fields();
        let accepts_empty = serde_json::from_str::<T::Insert>("{}").is_ok();

        if accepts_empty && !required.is_empty() {
            result.add_mismatch(
                T::SCHEMA,
                T::NAME,
                format!(
                    "Insert record accepts {{}} but requires {}",
                    required.join(", ")
                ),
            );
        } else if !accepts_empty && required.is_empty() {
            result.add_mismatch(
                T::SCHEMA,
                T::NAME,
                "Insert record rejects {} although no field is required".to_string(),
            );
        }
    }

    fn check_update_record<T: Table>(&self, result: &mut VerificationResult) {
        match serde_json::to_value(T::Update::default()) {
            Ok(Value::Object(map)) if map.is_empty() => {}
            Ok(value) => result.add_mismatch(
                T::SCHEMA,
                T::NAME,
                format!("empty Update record serializes to {} instead of {{}}", value),
            ),
            Err(e) => result.add_mismatch(
                T::SCHEMA,
                T::NAME,
                format!("empty Update record does not serialize: {}", e),
            ),
        }

        let shape = T::update_shape();
        let all_null: Map<String, Value> = shape
            .fields
            .iter()
            .map(|f| (f.name.to_string(), Value::Null))
            .collect();

        let sent: BTreeSet<String> = match serde_json::from_value::<T::Update>(Value::Object(all_null))
            .and_then(serde_json::to_value)
        {
            Ok(Value::Object(map)) => map.keys().cloned().collect(),
            Ok(_) => {
                result.add_mismatch(
                    T::SCHEMA,
                    T::NAME,
                    "Update record does not serialize to an object".to_string(),
                );
                return;
            }
            Err(e) => {
                result.add_mismatch(
                    T::SCHEMA,
                    T::NAME,
                    format!("Update record rejects null fields: {}", e),
                );
                return;
            }
        };

        let nullable: BTreeSet<String> = shape
            .fields
            .iter()
            .filter(|f| f.nullable)
            .map(|f| f.name.to_string())
            .collect();

        for missing in nullable.difference(&sent) {
            result.add_mismatch(
                T::SCHEMA,
                T::NAME,
                format!("Update record drops explicit null for '{}'", missing),
            );
        }
        for extra in sent.difference(&nullable) {
            result.add_mismatch(
                T::SCHEMA,
                T::NAME,
                format!("Update record sends null for non-nullable '{}'", extra),
            );
        }
    }

    fn check_unique_columns(&self, schema: &SchemaDef, table: &TableDef, result: &mut VerificationResult) {
        let mut seen = HashSet::new();
        for column in table.columns {
            if !seen.insert(column.name) {
                result.add_mismatch(
                    schema.name,
                    table.name,
                    format!("column '{}' declared more than once", column.name),
                );
            }
        }
    }

    fn check_relationships(&self, schema: &SchemaDef, table: &TableDef, result: &mut VerificationResult) {
        for rel in table.relationships {
            if rel.columns.len() != rel.referenced_columns.len() {
                result.add_mismatch(
                    schema.name,
                    table.name,
                    format!(
                        "{}: {} columns reference {} columns",
                        rel.foreign_key_name,
                        rel.columns.len(),
                        rel.referenced_columns.len()
                    ),
                );
                continue;
            }

            let Some(target) = schema.row_shape(rel.referenced_relation) else {
                result.add_mismatch(
                    schema.name,
                    table.name,
                    format!(
                        "{}: referenced relation '{}' does not exist",
                        rel.foreign_key_name, rel.referenced_relation
                    ),
                );
                continue;
            };

            for (from, to) in rel.columns.iter().zip(rel.referenced_columns.iter()) {
                let Some(source) = table.column(from) else {
                    result.add_mismatch(
                        schema.name,
                        table.name,
                        format!("{}: source column '{}' does not exist", rel.foreign_key_name, from),
                    );
                    continue;
                };

                match target.field(to) {
                    None => result.add_mismatch(
                        schema.name,
                        table.name,
                        format!(
                            "{}: referenced column '{}.{}' does not exist",
                            rel.foreign_key_name, rel.referenced_relation, to
                        ),
                    ),
                    Some(target_field) if target_field.column_type != source.column_type => {
                        result.add_mismatch(
                            schema.name,
                            table.name,
                            format!(
                                "{}: '{}' is {} but '{}.{}' is {}",
                                rel.foreign_key_name,
                                from,
                                source.column_type,
                                rel.referenced_relation,
                                to,
                                target_field.column_type
                            ),
                        )
                    }
                    Some(_) => {}
                }
            }
        }
    }
}

impl Default for SchemaVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog::Relationship;
    use crate::schema::column::ColumnDef;
    use crate::schema::types::ColumnType;

    static SITES: TableDef = TableDef {
        name: "sites",
        columns: &[
            ColumnDef::new("id", ColumnType::Integer).primary_key().identity(),
            ColumnDef::new("code", ColumnType::Text).not_null(),
            ColumnDef::new("code", ColumnType::Text),
        ],
        relationships: &[],
    };

    static STOCK: TableDef = TableDef {
        name: "stock",
        columns: &[
            ColumnDef::new("id", ColumnType::Uuid).primary_key().default_expr("gen_random_uuid()"),
            ColumnDef::new("site_id", ColumnType::Text),
            ColumnDef::new("bin_id", ColumnType::Integer),
        ],
        relationships: &[
            Relationship {
                foreign_key_name: "stock_site_id_fkey",
                columns: &["site_id"],
                is_one_to_one: false,
                referenced_relation: "sites",
                referenced_columns: &["id"],
            },
            Relationship {
                foreign_key_name: "stock_bin_id_fkey",
                columns: &["bin_id"],
                is_one_to_one: false,
                referenced_relation: "bins",
                referenced_columns: &["id"],
            },
            Relationship {
                foreign_key_name: "stock_site_code_fkey",
                columns: &["site_id"],
                is_one_to_one: false,
                referenced_relation: "sites",
                referenced_columns: &["missing"],
            },
        ],
    };

    static BROKEN: SchemaDef = SchemaDef {
        name: "public",
        tables: &[&SITES, &STOCK],
        views: &[],
        functions: &[],
        enums: &[],
        composite_types: &[],
    };

    static BROKEN_DB: Database = Database {
        postgrest_version: "12",
        schemas: &[&BROKEN],
    };

    #[test]
    fn test_reports_broken_catalog() {
        let result = SchemaVerifier::new().verify(&BROKEN_DB);

        assert!(!result.passed);
        assert_eq!(result.tables_checked, 2);

        let issues: Vec<_> = result.mismatches.iter().map(|m| m.issue.as_str()).collect();
        assert!(issues.iter().any(|i| i.contains("declared more than once")));
        assert!(issues.iter().any(|i| i.contains("'site_id' is TEXT but 'sites.id' is INTEGER")));
        assert!(issues.iter().any(|i| i.contains("referenced relation 'bins' does not exist")));
        assert!(issues.iter().any(|i| i.contains("referenced column 'sites.missing' does not exist")));
    }

    #[test]
    fn test_error_log_lists_mismatches() {
        let result = SchemaVerifier::new().verify(&BROKEN_DB);
        let log = result.error_log();
        assert!(log.contains("SCHEMA VERIFICATION FAILED"));
        assert!(log.contains("public.stock"));
        assert!(log.contains("ACTION REQUIRED"));
    }

    static ITEMS: TableDef = TableDef {
        name: "items",
        columns: &[
            ColumnDef::new("id", ColumnType::Integer).primary_key().identity(),
            ColumnDef::new("label", ColumnType::Text).not_null(),
            ColumnDef::new("note", ColumnType::Text),
        ],
        relationships: &[],
    };

    struct Items;

    #[derive(Serialize, serde::Deserialize)]
    struct LooseInsert {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    }

    #[derive(Default, Serialize, serde::Deserialize)]
    struct ChattyUpdate {
        label: Option<String>,
        note: Option<String>,
    }

    impl Table for Items {
        const NAME: &'static str = "items";

        type Row = serde_json::Value;
        type Insert = LooseInsert;
        type Update = ChattyUpdate;

        fn definition() -> &'static TableDef {
            &ITEMS
        }
    }

    #[test]
    fn test_reports_records_out_of_step_with_shapes() {
        let mut result = VerificationResult::new();
        SchemaVerifier::new().verify_records::<Items>(&mut result);

        assert!(!result.passed);
        let issues: Vec<_> = result.mismatches.iter().map(|m| m.issue.as_str()).collect();
        assert_eq!(issues.len(), 3, "{:?}", issues);
        assert!(issues.iter().any(|i| i.contains("Insert record accepts {} but requires label")));
        assert!(issues.iter().any(|i| i.contains("empty Update record serializes to")));
        assert!(issues.iter().any(|i| i.contains("sends null for non-nullable 'label'")));
        assert!(result.mismatches.iter().all(|m| m.schema == "public" && m.table == "items"));
    }

    #[test]
    fn test_empty_result_passes() {
        let result = VerificationResult::new();
        assert!(result.passed);
        assert!(result.error_log().contains("PASSED"));
    }
}
