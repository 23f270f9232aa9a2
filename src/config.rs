// Runtime configuration from the environment (and an optional .env file)

use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "cars.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file holding the `cars` table (`CARS_DB_PATH`)
    pub db_path: PathBuf,
    /// flexi_logger spec, e.g. `info` or `car_inventory=debug` (`CARS_LOG_LEVEL`)
    pub log_level: String,
    /// Directory for rotating log files (`CARS_LOG_DIR`)
    pub log_dir: PathBuf,
    /// Listen address for the API server (`CARS_SERVER_ADDR`)
    pub server_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the `CARS_*` variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            db_path: get("CARS_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            log_level: get("CARS_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: get("CARS_LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            server_addr: get("CARS_SERVER_ADDR").unwrap_or(defaults.server_addr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.db_path, PathBuf::from("cars.db"));
    }

    #[test]
    fn test_values_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("CARS_DB_PATH", "/tmp/fleet.db"),
            ("CARS_LOG_LEVEL", "debug"),
            ("CARS_SERVER_ADDR", "0.0.0.0:8080"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/tmp/fleet.db"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.server_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_blank_value_uses_default() {
        let config = Config::from_lookup(|key| (key == "CARS_LOG_LEVEL").then(|| "  ".to_string()));
        assert_eq!(config.log_level, "info");
    }
}
