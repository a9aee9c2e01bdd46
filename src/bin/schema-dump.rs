//! CLI tool to print the schema registry as JSON
//!
//! Usage:
//!   cargo run --bin schema-dump
//!   cargo run --bin schema-dump -- product
//!   cargo run --bin schema-dump -- product insert
//!   cargo run --bin schema-dump -- --fingerprint
//!   cargo run --bin schema-dump -- --verify

use std::collections::BTreeMap;
use std::env;

use chemwatch_schema::config::Config;
use chemwatch_schema::logging;
use chemwatch_schema::schema::{SchemaVerifier, Shape, ShapeKind, DATABASE};
use chemwatch_schema::tables::{Product, UserChemicalWatchList};
use chemwatch_schema::SchemaError;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

fn usage(program: &str) {
    eprintln!("Usage: {} [--fingerprint | --verify | <table> [row|insert|update]]", program);
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {}                        full registry as JSON", program);
    eprintln!("  {} product                Row, Insert and Update shapes", program);
    eprintln!("  {} product insert         a single shape", program);
    eprintln!("  {} --fingerprint          registry fingerprint only", program);
    eprintln!("  {} --verify               check registry invariants", program);
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}

fn table_shapes(config: &Config, table: &str, kinds: &[ShapeKind]) -> anyhow::Result<Vec<Shape>> {
    let schema = DATABASE.require_schema(&config.schema_name)?;
    let table = DATABASE.require_table((schema.name, table))?;
    Ok(kinds.iter().map(|kind| table.shape(schema.name, *kind)).collect())
}

fn run(config: &Config, program: &str, args: &[String]) -> anyhow::Result<i32> {
    match args {
        [] => {
            let fingerprint = DATABASE.fingerprint()?;
            print_json(
                &json!({
                    "fingerprint": fingerprint,
                    "database": DATABASE,
                    "constants": DATABASE.constants(),
                }),
                config.dump_pretty,
            )?;
        }
        [flag] if flag == "--fingerprint" => {
            println!("{}", DATABASE.fingerprint()?);
        }
        [flag] if flag == "--verify" => {
            let verifier = SchemaVerifier::new();
            let mut result = verifier.verify(&DATABASE);
            verifier.verify_records::<Product>(&mut result);
            verifier.verify_records::<UserChemicalWatchList>(&mut result);
            print!("{}", result.error_log());
            if !result.passed {
                return Ok(1);
            }
        }
        [table] => {
            let shapes = table_shapes(config, table, &ShapeKind::ALL)?;
            let by_kind: BTreeMap<String, Shape> = shapes
                .into_iter()
                .map(|shape| (shape.kind.to_string().to_lowercase(), shape))
                .collect();
            print_json(&by_kind, config.dump_pretty)?;
        }
        [table, kind] => {
            let Some(kind) = ShapeKind::parse(kind) else {
                eprintln!("Error: Unknown shape '{}', expected row, insert or update", kind);
                return Ok(1);
            };
            let shapes = table_shapes(config, table, &[kind])?;
            print_json(&shapes[0], config.dump_pretty)?;
        }
        _ => {
            usage(program);
            return Ok(1);
        }
    }

    Ok(0)
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("schema-dump");

    let dotenv_result = dotenvy::dotenv();

    let config = Config::from_env();
    let guard = logging::init(&config);

    if let Err(e) = dotenv_result {
        debug!("No .env file loaded: {}", e);
    }

    if args.iter().skip(1).any(|a| a == "-h" || a == "--help") {
        usage(program);
        std::process::exit(0);
    }

    let code = match run(&config, program, args.get(1..).unwrap_or_default()) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<SchemaError>() {
                Some(err) => {
                    warn!("{}", err);
                    match serde_json::to_string_pretty(&err.report()) {
                        Ok(report) => eprintln!("{}", report),
                        Err(_) => eprintln!("Error: {}", err),
                    }
                }
                None => eprintln!("Error: {}", e),
            }
            1
        }
    };

    drop(guard);
    std::process::exit(code);
}
