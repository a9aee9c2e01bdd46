use std::env;
use std::path::PathBuf;

use crate::schema::DEFAULT_SCHEMA;

/// Console log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub schema_name: String,
    pub log_dir: Option<PathBuf>,
    pub log_format: LogFormat,
    pub dump_pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_name: DEFAULT_SCHEMA.to_string(),
            log_dir: None,
            log_format: LogFormat::Text,
            dump_pretty: true,
        }
    }
}

impl Config {
    /// Unset or invalid variables fall back to defaults, so this cannot fail
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let schema_name = lookup("SCHEMA_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

        let log_dir = lookup("LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let log_format = match lookup("LOG_FORMAT")
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let dump_pretty = lookup("DUMP_PRETTY")
            .and_then(|s| s.trim().parse::<bool>().ok())
            .unwrap_or(true);

        Config {
            schema_name,
            log_dir,
            log_format,
            dump_pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.schema_name, "public");
        assert!(config.log_dir.is_none());
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.dump_pretty);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SCHEMA_NAME", "staging"),
            ("LOG_DIR", "/tmp/logs"),
            ("LOG_FORMAT", "JSON"),
            ("DUMP_PRETTY", "false"),
        ]);
        assert_eq!(config.schema_name, "staging");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.dump_pretty);
    }

    #[test]
    fn test_from_env_never_leaves_schema_empty() {
        let config = Config::from_env();
        assert!(!config.schema_name.trim().is_empty());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[("SCHEMA_NAME", "  "), ("DUMP_PRETTY", "maybe")]);
        assert_eq!(config.schema_name, "public");
        assert!(config.dump_pretty);
    }
}
