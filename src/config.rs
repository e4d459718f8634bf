/// Configuration management for the Aelia card service
use crate::barcode::MAX_PAYLOAD_LEN;
use crate::error::{AeliaError, AeliaResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default per-file upload cap (8 MiB)
pub const DEFAULT_UPLOAD_LIMIT: usize = 8 * 1024 * 1024;

/// Log filter used when RUST_LOG is unset or unparseable
pub const DEFAULT_LOG_FILTER: &str = "aelia_id=debug,tower_http=debug";

// "-" plus a hyphenated UUID follows the prefix in fallback payloads
const FALLBACK_SUFFIX_LEN: usize = 37;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub barcode: BarcodeConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Externally visible URL prepended to asset paths
    pub base_url: String,
    pub upload_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub db_file: PathBuf,
    pub upload_directory: PathBuf,
}

/// Barcode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeConfig {
    /// Prefix of the payload used when a card has no idnum
    pub fallback_prefix: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AeliaResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> AeliaResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "4000".to_string())
            .parse()
            .map_err(|_| AeliaError::Config("Invalid port number".to_string()))?;

        let base_url = lookup("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let upload_limit = lookup("AELIA_UPLOAD_LIMIT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UPLOAD_LIMIT);

        let data_directory: PathBuf = lookup("AELIA_STORAGE_DIR")
            .unwrap_or_else(|| "./storage".to_string())
            .into();
        let db_file = lookup("AELIA_DB_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_directory.join("cards.json"));
        let upload_directory = lookup("AELIA_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_directory.join("uploads"));

        let fallback_prefix =
            lookup("AELIA_BARCODE_PREFIX").unwrap_or_else(|| "AEL".to_string());

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                host,
                port,
                base_url,
                upload_limit,
            },
            storage: StorageConfig {
                data_directory,
                db_file,
                upload_directory,
            },
            barcode: BarcodeConfig { fallback_prefix },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> AeliaResult<()> {
        if self.service.base_url.is_empty() {
            return Err(AeliaError::Config("Base URL cannot be empty".to_string()));
        }

        if self.service.upload_limit == 0 {
            return Err(AeliaError::Config(
                "Upload limit must be greater than zero".to_string(),
            ));
        }

        if self.barcode.fallback_prefix.is_empty() {
            return Err(AeliaError::Config(
                "Barcode fallback prefix cannot be empty".to_string(),
            ));
        }

        if self.barcode.fallback_prefix.len() + FALLBACK_SUFFIX_LEN > MAX_PAYLOAD_LEN {
            return Err(AeliaError::Config(format!(
                "Barcode fallback prefix must be at most {} characters",
                MAX_PAYLOAD_LEN - FALLBACK_SUFFIX_LEN
            )));
        }

        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AeliaResult<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.service.port, 4000);
        assert_eq!(config.service.base_url, "http://localhost:4000");
        assert_eq!(config.service.upload_limit, DEFAULT_UPLOAD_LIMIT);
        assert_eq!(config.storage.db_file, PathBuf::from("./storage/cards.json"));
        assert_eq!(
            config.storage.upload_directory,
            PathBuf::from("./storage/uploads")
        );
        assert_eq!(config.barcode.fallback_prefix, "AEL");
        assert_eq!(config.logging.level, DEFAULT_LOG_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_follows_port() {
        let config = config_from(&[("PORT", "8080")]).unwrap();
        assert_eq!(config.service.base_url, "http://localhost:8080");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let config = config_from(&[("BASE_URL", "https://cards.example.org/")]).unwrap();
        assert_eq!(config.service.base_url, "https://cards.example.org");
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, AeliaError::Config(_)));
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let config = config_from(&[("AELIA_UPLOAD_LIMIT", "0")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_filter_from_env() {
        let config = config_from(&[("RUST_LOG", "aelia_id=trace")]).unwrap();
        assert_eq!(config.logging.level, "aelia_id=trace");
    }

    #[test]
    fn test_fallback_prefix_must_fit_barcode() {
        let longest = "P".repeat(MAX_PAYLOAD_LEN - FALLBACK_SUFFIX_LEN);
        let config = config_from(&[("AELIA_BARCODE_PREFIX", longest.as_str())]).unwrap();
        assert!(config.validate().is_ok());

        let too_long = format!("{}P", longest);
        let config = config_from(&[("AELIA_BARCODE_PREFIX", too_long.as_str())]).unwrap();
        assert!(matches!(config.validate(), Err(AeliaError::Config(_))));
    }
}
