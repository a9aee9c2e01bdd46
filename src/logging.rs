//! Logging setup shared by the CLI tools.
//!
//! Console output goes to stderr so stdout stays machine-readable. When
//! `LOG_DIR` is configured, a daily-rotated JSON log file is written as well.

use crate::config::{Config, LogFormat};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_FILTER: &str = "warn,chemwatch_schema=info";

/// Initialize the global subscriber.
///
/// The returned guard must be held for as long as file logging should flush.
pub fn init(config: &Config) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (text_layer, json_layer) = match config.log_format {
        LogFormat::Text => (
            Some(fmt::layer().with_target(true).with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                fmt::layer()
                    .with_target(true)
                    .json()
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("Warning: Could not create log directory {}: {}", dir.display(), e);
            }

            match RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("chemwatch-schema")
                .filename_suffix("log")
                .build(dir)
            {
                Ok(appender) => {
                    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                    let layer = fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .json()
                        .with_writer(non_blocking);
                    (Some(layer), Some(guard))
                }
                Err(e) => {
                    eprintln!("Warning: File logging disabled: {}", e);
                    (None, None)
                }
            }
        }
        None => (None, None),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: Logging already initialized: {}", e);
    }

    guard
}
