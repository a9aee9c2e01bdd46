//! CLI tool to check the schema registry against a DDL dump of the live database
//!
//! Usage:
//!   supabase db dump --schema public > schema.sql
//!   cargo run --bin schema-drift -- schema.sql
//!   cargo run --bin schema-drift -- ./supabase/migrations
//!
//! Exit codes: 0 in sync, 1 error, 2 drift found.

use std::env;
use std::path::Path;

use chemwatch_schema::config::Config;
use chemwatch_schema::logging;
use chemwatch_schema::schema::{DdlParser, DriftChecker, DATABASE};
use tracing::{debug, info};

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("schema-drift");

    if args.len() != 2 || args[1] == "-h" || args[1] == "--help" {
        eprintln!("Usage: {} <ddl-file-or-directory>", program);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} ./schema.sql", program);
        eprintln!("  {} ./supabase/migrations", program);
        std::process::exit(1);
    }

    let dotenv_result = dotenvy::dotenv();

    let config = Config::from_env();
    let guard = logging::init(&config);

    if let Err(e) = dotenv_result {
        debug!("No .env file loaded: {}", e);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }

    let schema = match DATABASE.require_schema(&config.schema_name) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Checking schema {} against {}", schema.name, path.display());

    let code = match DdlParser::parse_path(path) {
        Ok(tables) => {
            let drift = DriftChecker::new().compare(schema, &tables);
            print!("{}", drift.format_drift());

            if drift.in_sync() {
                0
            } else {
                2
            }
        }
        Err(e) => {
            eprintln!("Error parsing DDL: {}", e);
            1
        }
    };

    drop(guard);
    std::process::exit(code);
}
