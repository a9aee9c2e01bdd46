//! DDL parser
//!
//! Reads the table definitions out of a SQL dump of the remote schema, such
//! as the output of `pg_dump --schema-only` or `supabase db dump`.
//!
//! Understood statements:
//! - `CREATE TABLE [IF NOT EXISTS] [schema.]name (...)` with column
//!   constraints and table-level PRIMARY KEY / UNIQUE / FOREIGN KEY
//! - `ALTER TABLE [ONLY] name ADD CONSTRAINT ... PRIMARY KEY | UNIQUE | FOREIGN KEY`
//! - `ALTER TABLE name ALTER COLUMN c ADD GENERATED ... AS IDENTITY | SET DEFAULT | SET NOT NULL`
//!
//! Everything else (functions, policies, grants...) is skipped.

use crate::error::{Result, SchemaError};
use crate::schema::catalog::DEFAULT_SCHEMA;
use crate::schema::types::ColumnType;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

const QUALIFIED_NAME: &str = r#"((?:"[^"]+"|\w+)(?:\s*\.\s*(?:"[^"]+"|\w+))?)"#;

/// A column parsed from DDL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DdlColumn {
    pub name: String,
    /// Type as written, normalized to upper case
    pub data_type: String,
    /// `None` when the type has no registry equivalent
    pub column_type: Option<ColumnType>,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default: Option<String>,
    pub identity: bool,
}

impl DdlColumn {
    pub fn has_default(&self) -> bool {
        self.default.is_some() || self.identity
    }
}

/// A foreign key parsed from DDL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DdlForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_delete: Option<String>,
}

/// A table parsed from DDL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DdlTable {
    pub schema: String,
    pub name: String,
    pub columns: Vec<DdlColumn>,
    pub foreign_keys: Vec<DdlForeignKey>,
}

impl DdlTable {
    pub fn column(&self, name: &str) -> Option<&DdlColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn column_mut(&mut self, name: &str) -> Option<&mut DdlColumn> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// A foreign key is one-to-one when its columns are the primary key or a
    /// single unique column
    pub fn is_one_to_one(&self, fk: &DdlForeignKey) -> bool {
        let pk = self.primary_key();
        if !pk.is_empty() && pk.len() == fk.columns.len() && fk.columns.iter().all(|c| pk.contains(&c.as_str())) {
            return true;
        }
        fk.columns.len() == 1
            && self
                .column(&fk.columns[0])
                .map(|c| c.unique)
                .unwrap_or(false)
    }

    fn apply_primary_key(&mut self, columns: &[String]) {
        for name in columns {
            match self.column_mut(name) {
                Some(column) => {
                    column.primary_key = true;
                    column.nullable = false;
                }
                None => warn!("PRIMARY KEY on unknown column {}.{}", self.name, name),
            }
        }
    }

    fn apply_unique(&mut self, columns: &[String]) {
        // composite uniqueness says nothing about a single column
        if let [name] = columns {
            match self.column_mut(name) {
                Some(column) => column.unique = true,
                None => warn!("UNIQUE on unknown column {}.{}", self.name, name),
            }
        }
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex pattern is valid"))
}

fn create_table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        &format!(
            r#"(?is)^CREATE\s+(?:(?:UNLOGGED|TEMP|TEMPORARY)\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?{}\s*\("#,
            QUALIFIED_NAME
        ),
    )
}

fn alter_table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        &format!(
            r#"(?is)^ALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?{}\s+(.*)$"#,
            QUALIFIED_NAME
        ),
    )
}

fn column_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r#"(?is)^("[^"]+"|\w+)\s+(timestamp(?:\s*\(\d+\))?\s+with(?:out)?\s+time\s+zone|time(?:\s*\(\d+\))?\s+with(?:out)?\s+time\s+zone|double\s+precision|character\s+varying(?:\s*\(\d+\))?|(?:"[^"]+"|[\w.]+)(?:\s*\.\s*"[^"]+")?(?:\s*\([^)]*\))?)((?:\s*\[\s*\])*)(.*)$"#,
    )
}

fn default_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r#"(?is)\bDEFAULT\s+(.+?)\s*(?:\bNOT\s+NULL\b|\bNULL\b|\bPRIMARY\s+KEY\b|\bUNIQUE\b|\bREFERENCES\b|\bCHECK\b|\bCONSTRAINT\b|\bGENERATED\b|\bCOLLATE\b|$)"#,
    )
}

fn identity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"(?is)GENERATED\s+(?:ALWAYS|BY\s+DEFAULT)\s+AS\s+IDENTITY(?:\s*\([^)]*\))?",
    )
}

fn references_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        &format!(
            r#"(?is)REFERENCES\s+{}\s*(?:\(([^)]*)\))?(.*)"#,
            QUALIFIED_NAME
        ),
    )
}

fn foreign_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        &format!(
            r#"(?is)FOREIGN\s+KEY\s*\(([^)]*)\)\s*REFERENCES\s+{}\s*(?:\(([^)]*)\))?(.*)"#,
            QUALIFIED_NAME
        ),
    )
}

fn constraint_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"(?is)^CONSTRAINT\s+("[^"]+"|\w+)\s+(.*)$"#)
}

/// Leading keyword of a table constraint, matched as a whole word so columns
/// such as `likelihood` or `unique_code` stay columns
fn table_constraint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?is)^(PRIMARY\s+KEY|UNIQUE|FOREIGN\s+KEY|CHECK|EXCLUDE|LIKE)\b")
}

fn inline_constraint_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"(?is)\bCONSTRAINT\s+("[^"]+"|\w+)\s+REFERENCES\b"#)
}

fn key_columns_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"(?is)^(PRIMARY\s+KEY|UNIQUE)(?:\s+NULLS\s+(?:NOT\s+)?DISTINCT)?\s*\(([^)]*)\)"#)
}

fn alter_column_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r#"(?is)^ALTER\s+(?:COLUMN\s+)?("[^"]+"|\w+)\s+(ADD\s+GENERATED\b.*|SET\s+DEFAULT\s+.*|SET\s+NOT\s+NULL|DROP\s+NOT\s+NULL|DROP\s+DEFAULT)$"#,
    )
}

fn on_delete_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"(?i)ON\s+DELETE\s+(CASCADE|RESTRICT|SET\s+NULL|SET\s+DEFAULT|NO\s+ACTION)",
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    /// CHECK, EXCLUDE and LIKE carry nothing the registry describes
    Ignored,
}

impl ConstraintKind {
    fn of(definition: &str) -> Option<Self> {
        let caps = table_constraint_re().captures(definition)?;
        let keyword = caps[1].to_uppercase();
        let kind = if keyword.starts_with("PRIMARY") {
            ConstraintKind::PrimaryKey
        } else if keyword == "UNIQUE" {
            ConstraintKind::Unique
        } else if keyword.starts_with("FOREIGN") {
            ConstraintKind::ForeignKey
        } else {
            ConstraintKind::Ignored
        };
        Some(kind)
    }
}

/// Parses table definitions from SQL text
pub struct DdlParser;

impl DdlParser {
    /// Parse every `.sql`, `.pgsql` and `.pssql` file in a directory, in name order
    pub fn parse_directory(dir: &Path) -> Result<Vec<DdlTable>> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| io_error(dir, e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .map(|ext| ext == "sql" || ext == "pgsql" || ext == "pssql")
                        .unwrap_or(false)
            })
            .collect();

        // Sort for consistent ordering
        files.sort();

        let mut all_sql = String::new();
        for path in &files {
            debug!("Reading DDL file {:?}", path);
            let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
            all_sql.push_str(&content);
            all_sql.push_str(";\n");
        }

        info!("Parsing {} DDL files from {:?}", files.len(), dir);
        Self::parse_sql(&all_sql)
    }

    /// Parse a single SQL file, or a directory of them
    pub fn parse_path(path: &Path) -> Result<Vec<DdlTable>> {
        if path.is_dir() {
            return Self::parse_directory(path);
        }
        let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        Self::parse_sql(&content)
    }

    pub fn parse_sql(sql: &str) -> Result<Vec<DdlTable>> {
        let sql = Self::remove_comments(sql);
        let mut tables: Vec<DdlTable> = Vec::new();

        for statement in Self::split_statements(&sql) {
            if let Some(caps) = create_table_re().captures(&statement) {
                let (schema, name) = split_qualified(&caps[1]);
                let body_start = caps.get(0).map(|m| m.end()).unwrap_or(0);
                let body = Self::enclosed_body(&statement[body_start..]).ok_or_else(|| {
                    SchemaError::DdlParseFailed {
                        cause: format!("unterminated column list in CREATE TABLE {}", name),
                    }
                })?;

                let table = Self::parse_table_body(&schema, &name, body);
                debug!(
                    "Parsed table {}.{} with {} columns",
                    table.schema,
                    table.name,
                    table.columns.len()
                );

                tables.retain(|t| !(t.schema == table.schema && t.name == table.name));
                tables.push(table);
            } else if let Some(caps) = alter_table_re().captures(&statement) {
                let (schema, name) = split_qualified(&caps[1]);
                match tables.iter_mut().find(|t| t.schema == schema && t.name == name) {
                    Some(table) => {
                        for action in split_top_level(&caps[2], ',') {
                            Self::apply_alter_action(table, action.trim());
                        }
                    }
                    None => debug!("Skipping ALTER TABLE on unparsed table {}.{}", schema, name),
                }
            }
        }

        Self::resolve_implicit_references(&mut tables);

        Ok(tables)
    }

    /// Remove `--` and `/* */` comments outside string literals
    fn remove_comments(sql: &str) -> String {
        let mut output = String::with_capacity(sql.len());
        let mut chars = sql.chars().peekable();
        let mut in_single = false;
        let mut in_double = false;

        while let Some(ch) = chars.next() {
            match ch {
                '\'' if !in_double => {
                    in_single = !in_single;
                    output.push(ch);
                }
                '"' if !in_single => {
                    in_double = !in_double;
                    output.push(ch);
                }
                '-' if !in_single && !in_double && chars.peek() == Some(&'-') => {
                    for next in chars.by_ref() {
                        if next == '\n' {
                            output.push('\n');
                            break;
                        }
                    }
                }
                '/' if !in_single && !in_double && chars.peek() == Some(&'*') => {
                    chars.next();
                    let mut prev = '\0';
                    for next in chars.by_ref() {
                        if prev == '*' && next == '/' {
                            break;
                        }
                        prev = next;
                    }
                    output.push(' ');
                }
                _ => output.push(ch),
            }
        }

        output
    }

    /// Split SQL into statements on `;`, respecting quotes and `$tag$` bodies
    fn split_statements(sql: &str) -> Vec<String> {
        let mut statements = Vec::new();
        let mut current = String::new();
        let mut in_single = false;
        let mut in_double = false;
        let mut dollar_tag: Option<String> = None;
        let bytes = sql.as_bytes();
        let mut i = 0;

        while i < sql.len() {
            let ch = bytes[i] as char;

            if let Some(tag) = &dollar_tag {
                if sql[i..].starts_with(tag.as_str()) {
                    current.push_str(tag);
                    i += tag.len();
                    dollar_tag = None;
                    continue;
                }
            } else if ch == '\'' && !in_double {
                in_single = !in_single;
            } else if ch == '"' && !in_single {
                in_double = !in_double;
            } else if ch == '$' && !in_single && !in_double {
                if let Some(tag) = dollar_quote_tag(&sql[i..]) {
                    current.push_str(&tag);
                    i += tag.len();
                    dollar_tag = Some(tag);
                    continue;
                }
            } else if ch == ';' && !in_single && !in_double {
                let statement = current.trim();
                if !statement.is_empty() {
                    statements.push(statement.to_string());
                }
                current.clear();
                i += 1;
                continue;
            }

            // advance by a whole character so multi-byte text stays intact
            let width = sql[i..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            current.push_str(&sql[i..i + width]);
            i += width;
        }

        let statement = current.trim();
        if !statement.is_empty() {
            statements.push(statement.to_string());
        }

        statements
    }

    /// Text up to the parenthesis closing an already-opened one
    fn enclosed_body(text: &str) -> Option<&str> {
        let mut depth = 1usize;
        let mut in_single = false;
        let mut in_double = false;

        for (idx, ch) in text.char_indices() {
            match ch {
                '\'' if !in_double => in_single = !in_single,
                '"' if !in_single => in_double = !in_double,
                '(' if !in_single && !in_double => depth += 1,
                ')' if !in_single && !in_double => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[..idx]);
                    }
                }
                _ => {}
            }
        }

        None
    }

    fn parse_table_body(schema: &str, name: &str, body: &str) -> DdlTable {
        let mut table = DdlTable {
            schema: schema.to_string(),
            name: name.to_string(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        };
        let mut pending_keys: Vec<(ConstraintKind, Vec<String>)> = Vec::new();

        for part in split_top_level(body, ',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (constraint_name, definition) = match constraint_name_re().captures(part) {
                Some(caps) => (Some(unquote(&caps[1])), caps[2].to_string()),
                None => (None, part.to_string()),
            };
            match ConstraintKind::of(&definition) {
                Some(kind @ (ConstraintKind::PrimaryKey | ConstraintKind::Unique)) => {
                    if let Some(caps) = key_columns_re().captures(&definition) {
                        pending_keys.push((kind, split_identifiers(&caps[2])));
                    }
                }
                Some(ConstraintKind::ForeignKey) => {
                    if let Some(fk) = Self::parse_foreign_key(&table, constraint_name, &definition) {
                        table.foreign_keys.push(fk);
                    }
                }
                Some(ConstraintKind::Ignored) => {}
                None => match Self::parse_column(&table.name, &definition) {
                    Some((column, reference)) => {
                        table.foreign_keys.extend(reference);
                        table.columns.push(column);
                    }
                    None => warn!("Could not parse column definition in {}: {}", name, part),
                },
            }
        }

        for (kind, columns) in pending_keys {
            if kind == ConstraintKind::PrimaryKey {
                table.apply_primary_key(&columns);
            } else {
                table.apply_unique(&columns);
            }
        }

        table
    }

    /// Parse a column definition, returning any inline REFERENCES foreign key
    fn parse_column(table: &str, part: &str) -> Option<(DdlColumn, Option<DdlForeignKey>)> {
        let caps = column_re().captures(part)?;
        let name = unquote(&caps[1]);
        let raw_type = format!("{}{}", &caps[2], caps[3].split_whitespace().collect::<String>());
        let constraints = caps[4].to_string();
        let upper = constraints.to_uppercase();

        let primary_key = upper.contains("PRIMARY KEY");
        let nullable = !primary_key && !upper.contains("NOT NULL");
        let identity = ColumnType::is_serial(&raw_type) || identity_re().is_match(&constraints);
        // `GENERATED BY DEFAULT` is not a DEFAULT clause
        let without_identity = identity_re().replace_all(&constraints, " ");
        let default = default_re()
            .captures(&without_identity)
            .map(|c| normalize_default(&c[1]))
            .filter(|d| !d.eq_ignore_ascii_case("NULL"));

        let reference = references_re().captures(&constraints).map(|c| {
            let (referenced_schema, referenced_table) = split_qualified(&c[1]);
            let fk_name = inline_constraint_name_re()
                .captures(&constraints)
                .map(|n| unquote(&n[1]))
                .unwrap_or_else(|| format!("{}_{}_fkey", table, name));
            DdlForeignKey {
                name: fk_name,
                columns: vec![name.clone()],
                referenced_schema,
                referenced_table,
                referenced_columns: c.get(2).map(|m| split_identifiers(m.as_str())).unwrap_or_default(),
                on_delete: extract_on_delete(&c[3]),
            }
        });

        let column = DdlColumn {
            name,
            data_type: ColumnType::normalize(&raw_type),
            column_type: ColumnType::from_sql(&raw_type),
            nullable,
            primary_key,
            unique: upper.contains("UNIQUE"),
            default,
            identity,
        };

        Some((column, reference))
    }

    fn parse_foreign_key(
        table: &DdlTable,
        constraint_name: Option<String>,
        definition: &str,
    ) -> Option<DdlForeignKey> {
        let caps = foreign_key_re().captures(definition)?;
        let columns = split_identifiers(&caps[1]);
        let (referenced_schema, referenced_table) = split_qualified(&caps[2]);
        let name = constraint_name
            .unwrap_or_else(|| format!("{}_{}_fkey", table.name, columns.join("_")));

        Some(DdlForeignKey {
            name,
            columns,
            referenced_schema,
            referenced_table,
            referenced_columns: caps
                .get(3)
                .map(|m| split_identifiers(m.as_str()))
                .unwrap_or_default(),
            on_delete: extract_on_delete(&caps[4]),
        })
    }

    fn apply_alter_action(table: &mut DdlTable, action: &str) {
        if let Some(rest) = strip_prefix_ci(action, "ADD ") {
            let rest = rest.trim();
            let (constraint_name, definition) = match constraint_name_re().captures(rest) {
                Some(caps) => (Some(unquote(&caps[1])), caps[2].to_string()),
                None => (None, rest.to_string()),
            };
            match ConstraintKind::of(&definition) {
                Some(kind @ (ConstraintKind::PrimaryKey | ConstraintKind::Unique)) => {
                    if let Some(caps) = key_columns_re().captures(&definition) {
                        let columns = split_identifiers(&caps[2]);
                        if kind == ConstraintKind::PrimaryKey {
                            table.apply_primary_key(&columns);
                        } else {
                            table.apply_unique(&columns);
                        }
                    }
                }
                Some(ConstraintKind::ForeignKey) => {
                    if let Some(fk) = Self::parse_foreign_key(table, constraint_name, &definition) {
                        table.foreign_keys.retain(|existing| existing.name != fk.name);
                        table.foreign_keys.push(fk);
                    }
                }
                Some(ConstraintKind::Ignored) => {}
                None if constraint_name.is_none() => {
                    // ADD [COLUMN] definition
                    let definition = strip_prefix_ci(&definition, "COLUMN ")
                        .unwrap_or(&definition)
                        .trim()
                        .to_string();
                    if let Some((column, reference)) = Self::parse_column(&table.name, &definition) {
                        table.foreign_keys.extend(reference);
                        table.columns.retain(|c| c.name != column.name);
                        table.columns.push(column);
                    }
                }
                None => debug!("Ignoring constraint on {}: {}", table.name, definition),
            }
            return;
        }

        let Some(caps) = alter_column_re().captures(action) else {
            debug!("Ignoring ALTER TABLE action on {}: {}", table.name, action);
            return;
        };

        let column_name = unquote(&caps[1]);
        let change = caps[2].to_string();
        let change_upper = change.to_uppercase();
        let table_name = table.name.clone();

        let Some(column) = table.column_mut(&column_name) else {
            warn!("ALTER COLUMN on unknown column {}.{}", table_name, column_name);
            return;
        };

        if change_upper.starts_with("ADD GENERATED") {
            column.identity = true;
        } else if change_upper.starts_with("SET DEFAULT") {
            if let Some(idx) = change_upper.find("DEFAULT") {
                column.default = Some(normalize_default(&change[idx + "DEFAULT".len()..]));
            }
        } else if change_upper.starts_with("DROP DEFAULT") {
            column.default = None;
        } else if change_upper.starts_with("SET NOT NULL") {
            column.nullable = false;
        } else if change_upper.starts_with("DROP NOT NULL") {
            column.nullable = true;
        }
    }

    /// `REFERENCES t` without a column list points at t's primary key
    fn resolve_implicit_references(tables: &mut [DdlTable]) {
        let primary_keys: Vec<(String, String, Vec<String>)> = tables
            .iter()
            .map(|t| {
                (
                    t.schema.clone(),
                    t.name.clone(),
                    t.primary_key().into_iter().map(String::from).collect(),
                )
            })
            .collect();

        for table in tables.iter_mut() {
            for fk in table.foreign_keys.iter_mut().filter(|fk| fk.referenced_columns.is_empty()) {
                let target = primary_keys
                    .iter()
                    .find(|(schema, name, _)| *schema == fk.referenced_schema && *name == fk.referenced_table);
                match target {
                    Some((_, _, pk)) if !pk.is_empty() => fk.referenced_columns = pk.clone(),
                    _ => warn!(
                        "Cannot resolve implicit reference of {} to {}.{}",
                        fk.name, fk.referenced_schema, fk.referenced_table
                    ),
                }
            }
        }
    }
}

fn io_error(path: &Path, err: std::io::Error) -> SchemaError {
    SchemaError::Io {
        path: path.display().to_string(),
        cause: err.to_string(),
    }
}

/// Split on a separator at parenthesis depth zero, outside quotes
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_single = false;
    let mut in_double = false;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '(' if !in_single && !in_double => depth += 1,
            ')' if !in_single && !in_double => depth -= 1,
            c if c == separator && depth == 0 && !in_single && !in_double => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }

    if !text[start..].trim().is_empty() {
        parts.push(&text[start..]);
    }

    parts
}

/// Quoted identifiers keep their case, bare ones fold to lower case
fn unquote(identifier: &str) -> String {
    let trimmed = identifier.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_lowercase()
    }
}

fn split_qualified(name: &str) -> (String, String) {
    let parts = split_top_level(name, '.');
    match parts.as_slice() {
        [schema, table] => (unquote(schema), unquote(table)),
        _ => (DEFAULT_SCHEMA.to_string(), unquote(name)),
    }
}

fn split_identifiers(list: &str) -> Vec<String> {
    list.split(',')
        .map(unquote)
        .filter(|s| !s.is_empty())
        .collect()
}

/// pg_dump quotes function names in defaults: `"now"()` -> `now()`
fn normalize_default(expression: &str) -> String {
    expression.trim().replace('"', "")
}

fn extract_on_delete(text: &str) -> Option<String> {
    on_delete_re()
        .captures(text)
        .map(|cap| cap[1].split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase())
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

fn dollar_quote_tag(text: &str) -> Option<String> {
    let rest = text.strip_prefix('$')?;
    let end = rest.find('$')?;
    let tag = &rest[..end];
    if tag.chars().all(|c| c.is_alphanumeric() || c == '_') && !tag.starts_with(|c: char| c.is_ascii_digit()) {
        Some(format!("${}$", tag))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SUPABASE_DUMP: &str = r#"
SET statement_timeout = 0;

CREATE OR REPLACE FUNCTION "public"."touch"() RETURNS "trigger"
    LANGUAGE "plpgsql"
    AS $$
BEGIN
  NEW.created_at := now(); -- keep; in body
  RETURN NEW;
END;
$$;

CREATE TABLE IF NOT EXISTS "public"."product" (
    "id" bigint NOT NULL,
    "created_at" timestamp with time zone DEFAULT "now"(),
    "barcode" "text" NOT NULL,
    "name" "text",
    "manufacturer" "text",
    "contents_size_weight" "text",
    "sds_url" "text"
);

ALTER TABLE "public"."product" OWNER TO "postgres";

ALTER TABLE "public"."product" ALTER COLUMN "id" ADD GENERATED BY DEFAULT AS IDENTITY (
    SEQUENCE NAME "public"."product_id_seq"
    START WITH 1
    INCREMENT BY 1
    NO MINVALUE
    NO MAXVALUE
    CACHE 1
);

ALTER TABLE ONLY "public"."product"
    ADD CONSTRAINT "product_barcode_key" UNIQUE ("barcode");

ALTER TABLE ONLY "public"."product"
    ADD CONSTRAINT "product_pkey" PRIMARY KEY ("id");
"#;

    #[test]
    fn test_parse_supabase_dump() {
        let tables = DdlParser::parse_sql(SUPABASE_DUMP).unwrap();
        assert_eq!(tables.len(), 1);

        let product = &tables[0];
        assert_eq!(product.schema, "public");
        assert_eq!(product.name, "product");
        assert_eq!(product.columns.len(), 7);

        let id = product.column("id").unwrap();
        assert!(id.primary_key);
        assert!(id.identity);
        assert!(!id.nullable);
        assert_eq!(id.column_type, Some(ColumnType::BigInt));

        let created_at = product.column("created_at").unwrap();
        assert_eq!(created_at.default, Some("now()".to_string()));
        assert_eq!(created_at.column_type, Some(ColumnType::Timestamptz));
        assert!(created_at.nullable);

        let barcode = product.column("barcode").unwrap();
        assert!(barcode.unique);
        assert!(!barcode.nullable);
        assert_eq!(barcode.column_type, Some(ColumnType::Text));
    }

    #[test]
    fn test_inline_and_table_level_foreign_keys() {
        let sql = r#"
            CREATE TABLE sites (
                site_id SERIAL PRIMARY KEY,
                code VARCHAR(20) NOT NULL UNIQUE
            );

            CREATE TABLE stock (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                site_id INTEGER REFERENCES sites ON DELETE CASCADE,
                bin_id INTEGER,
                CONSTRAINT stock_bin_fk FOREIGN KEY (bin_id) REFERENCES bins(bin_id)
            );
        "#;

        let tables = DdlParser::parse_sql(sql).unwrap();
        assert_eq!(tables.len(), 2);

        let stock = tables.iter().find(|t| t.name == "stock").unwrap();
        assert_eq!(stock.foreign_keys.len(), 2);

        let inline = &stock.foreign_keys[0];
        assert_eq!(inline.name, "stock_site_id_fkey");
        assert_eq!(inline.referenced_table, "sites");
        assert_eq!(inline.referenced_columns, vec!["site_id"]);
        assert_eq!(inline.on_delete, Some("CASCADE".to_string()));

        let named = &stock.foreign_keys[1];
        assert_eq!(named.name, "stock_bin_fk");
        assert_eq!(named.columns, vec!["bin_id"]);

        let id = stock.column("id").unwrap();
        assert_eq!(id.default, Some("gen_random_uuid()".to_string()));
        assert!(!id.nullable);

        let sites = tables.iter().find(|t| t.name == "sites").unwrap();
        assert!(sites.column("site_id").unwrap().identity);
        assert!(!stock.is_one_to_one(inline));
    }

    #[test]
    fn test_alter_table_foreign_key_and_composite_primary_key() {
        let sql = r#"
            CREATE TABLE public.assignments (
                user_id TEXT NOT NULL,
                product_id BIGINT,
                note TEXT DEFAULT 'a, b',
                PRIMARY KEY (user_id, product_id)
            );
            ALTER TABLE ONLY public.assignments
                ADD CONSTRAINT assignments_product_fkey FOREIGN KEY (product_id) REFERENCES public.product(id);
        "#;

        let tables = DdlParser::parse_sql(sql).unwrap();
        let assignments = &tables[0];

        assert_eq!(assignments.columns.len(), 3);
        assert_eq!(assignments.primary_key(), vec!["user_id", "product_id"]);
        assert!(!assignments.column("product_id").unwrap().nullable);
        assert_eq!(
            assignments.column("note").unwrap().default,
            Some("'a, b'".to_string())
        );

        let fk = &assignments.foreign_keys[0];
        assert_eq!(fk.name, "assignments_product_fkey");
        assert_eq!(fk.referenced_schema, "public");
        assert_eq!(fk.referenced_columns, vec!["id"]);
    }

    #[test]
    fn test_keyword_prefixed_column_names() {
        let sql = r#"
            CREATE TABLE hazards (
                id INT PRIMARY KEY,
                likelihood TEXT,
                checked_at TIMESTAMPTZ,
                unique_code TEXT,
                primary_contact TEXT,
                foreign_ref TEXT,
                exclude_flag BOOLEAN,
                CHECK (id > 0),
                UNIQUE (unique_code)
            );
            ALTER TABLE hazards ADD likelihood_note TEXT;
            ALTER TABLE hazards ADD CONSTRAINT hazards_id_check CHECK (id < 1000);
            ALTER TABLE hazards ADD UNIQUE (checked_at);
        "#;

        let tables = DdlParser::parse_sql(sql).unwrap();
        let hazards = &tables[0];

        let names: Vec<_> = hazards.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "likelihood",
                "checked_at",
                "unique_code",
                "primary_contact",
                "foreign_ref",
                "exclude_flag",
                "likelihood_note",
            ]
        );
        assert!(hazards.column("unique_code").unwrap().unique);
        assert!(hazards.column("checked_at").unwrap().unique);
        assert!(!hazards.column("likelihood").unwrap().unique);
        assert!(hazards.foreign_keys.is_empty());
    }

    #[test]
    fn test_named_inline_foreign_key() {
        let sql = r#"
            CREATE TABLE sites (id INT PRIMARY KEY);
            CREATE TABLE stock (
                id INT PRIMARY KEY,
                product_id BIGINT CONSTRAINT my_fk REFERENCES product(id),
                "site_id" INT CONSTRAINT "Stock_Site_FK" REFERENCES sites,
                bin_id INT REFERENCES bins(id)
            );
        "#;

        let tables = DdlParser::parse_sql(sql).unwrap();
        let stock = tables.iter().find(|t| t.name == "stock").unwrap();

        let names: Vec<_> = stock.foreign_keys.iter().map(|fk| fk.name.as_str()).collect();
        assert_eq!(names, vec!["my_fk", "Stock_Site_FK", "stock_bin_id_fkey"]);
        assert_eq!(stock.foreign_keys[0].columns, vec!["product_id"]);
        assert_eq!(stock.foreign_keys[1].referenced_columns, vec!["id"]);
        assert_eq!(stock.columns.len(), 4);
    }

    #[test]
    fn test_array_and_unknown_types() {
        let sql = "CREATE TABLE tags (labels TEXT[], level hazard_level NOT NULL);";
        let tables = DdlParser::parse_sql(sql).unwrap();
        let tags = &tables[0];

        let labels = tags.column("labels").unwrap();
        assert_eq!(labels.data_type, "TEXT[]");
        assert_eq!(labels.column_type, None);

        let level = tags.column("level").unwrap();
        assert_eq!(level.data_type, "HAZARD_LEVEL");
        assert!(!level.nullable);
    }

    #[test]
    fn test_unterminated_table_fails() {
        let err = DdlParser::parse_sql("CREATE TABLE broken (id INTEGER").unwrap_err();
        assert!(matches!(err, SchemaError::DdlParseFailed { .. }));
    }

    #[test]
    fn test_parse_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("001_product.sql"),
            "CREATE TABLE product (id BIGINT PRIMARY KEY, barcode TEXT NOT NULL)",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("002_alter.pgsql"),
            "ALTER TABLE product ADD COLUMN name TEXT",
        )
        .unwrap();
        fs::write(temp_dir.path().join("README.md"), "CREATE TABLE ignored (id INT);").unwrap();

        let tables = DdlParser::parse_path(temp_dir.path()).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns.len(), 3);
        assert!(tables[0].column("name").is_some());
    }

    #[test]
    fn test_missing_path_is_io_error() {
        let err = DdlParser::parse_path(Path::new("/nonexistent/schema.sql")).unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
    }
}
