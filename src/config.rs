use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value '{value}' for environment variable {key}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("storage backend 'postgres' requires a database url")]
    MissingDatabaseUrl,

    #[error("storage.tx_timeout_ms must be greater than 0")]
    ZeroTxTimeout,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "stn_accounts.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            gateway: GatewayConfig::default(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime in minutes
    pub jwt_exp_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "rest-app@@secret".to_string(),
            jwt_exp_minutes: 30,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Upper bound for one transaction scope, in milliseconds
    pub tx_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Postgres,
            database_url: None,
            max_connections: 10,
            tx_timeout_ms: 5_000,
        }
    }
}

impl StorageConfig {
    pub fn tx_timeout(&self) -> Duration {
        Duration::from_millis(self.tx_timeout_ms)
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml` (defaults when the file is absent), then apply
    /// process environment overrides.
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => Self::from_yaml(&config_path, &content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: config_path,
                    source,
                });
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.check()?;
        Ok(config)
    }

    pub fn from_yaml(path: &str, content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PORT") {
            self.gateway.port = parse_env("PORT", v)?;
        }
        if let Some(v) = lookup("HOST") {
            self.gateway.host = v;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.storage.database_url = Some(v);
        }
        if let Some(v) = lookup("DB_MAX_OPEN_CONNS") {
            self.storage.max_connections = parse_env("DB_MAX_OPEN_CONNS", v)?;
        }
        if let Some(v) = lookup("TX_TIMEOUT_MS") {
            self.storage.tx_timeout_ms = parse_env("TX_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("STORAGE") {
            self.storage.backend = parse_env("STORAGE", v)?;
        }
        if let Some(v) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_EXP_TIMEOUT") {
            self.auth.jwt_exp_minutes = parse_env("JWT_EXP_TIMEOUT", v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log_level = v;
        }
        Ok(())
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Postgres
            && self.storage.database_url.as_deref().is_none_or(str::is_empty)
        {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if self.storage.tx_timeout_ms == 0 {
            return Err(ConfigError::ZeroTxTimeout);
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.auth.jwt_secret, "rest-app@@secret");
        assert_eq!(config.auth.jwt_exp_minutes, 30);
        assert_eq!(config.storage.max_connections, 10);
        assert_eq!(config.storage.tx_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
log_level: debug
gateway:
  port: 8081
storage:
  backend: memory
"#;
        let config = AppConfig::from_yaml("inline", yaml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.gateway.port, 8081);
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.auth.jwt_exp_minutes, 30);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(lookup(&[
                ("PORT", "9090"),
                ("DATABASE_URL", "postgres://u:p@localhost/stn"),
                ("DB_MAX_OPEN_CONNS", "25"),
                ("JWT_SECRET", "s3cr3t"),
                ("JWT_EXP_TIMEOUT", "5"),
                ("STORAGE", "Memory"),
            ]))
            .unwrap();

        assert_eq!(config.gateway.port, 9090);
        assert_eq!(
            config.storage.database_url.as_deref(),
            Some("postgres://u:p@localhost/stn")
        );
        assert_eq!(config.storage.max_connections, 25);
        assert_eq!(config.auth.jwt_secret, "s3cr3t");
        assert_eq!(config.auth.jwt_exp_minutes, 5);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = AppConfig::default();
        let err = config.apply_env(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "PORT", .. }));

        let err = config
            .apply_env(lookup(&[("STORAGE", "redis")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "STORAGE", .. }));
    }

    #[test]
    fn test_postgres_requires_url() {
        let config = AppConfig::default();
        assert!(matches!(
            config.check(),
            Err(ConfigError::MissingDatabaseUrl)
        ));
    }

    #[test]
    fn test_zero_tx_timeout_is_rejected() {
        let mut config = AppConfig::default();
        config
            .apply_env(lookup(&[("STORAGE", "memory"), ("TX_TIMEOUT_MS", "0")]))
            .unwrap();
        assert!(matches!(config.check(), Err(ConfigError::ZeroTxTimeout)));

        config.apply_env(lookup(&[("TX_TIMEOUT_MS", "250")])).unwrap();
        assert!(config.check().is_ok());
        assert_eq!(config.storage.tx_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = AppConfig::from_yaml("config/bad.yaml", "gateway: [1, 2").unwrap_err();
        assert!(err.to_string().contains("config/bad.yaml"));
    }
}
