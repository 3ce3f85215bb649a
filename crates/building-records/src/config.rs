//! Configuration for the building records service

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming a TOML config file
pub const CONFIG_PATH_ENV: &str = "BUILDING_RECORDS_CONFIG";
/// Environment variable overriding the bind host
pub const HOST_ENV: &str = "BUILDING_RECORDS_HOST";
/// Environment variable overriding the bind port
pub const PORT_ENV: &str = "BUILDING_RECORDS_PORT";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Ingestion limits
    #[serde(default)]
    pub ingest: IngestConfig,
    /// CSV export configuration
    #[serde(default)]
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration from the environment
    ///
    /// Uses `BUILDING_RECORDS_CONFIG` if set, otherwise the user config
    /// directory's `building-records/config.toml` if it exists, otherwise
    /// defaults. Host and port can then be overridden individually.
    pub fn from_env() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::load(path)?
            }
            None => Self::default(),
        };

        if let Ok(host) = std::env::var(HOST_ENV) {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            config.server.port = port
                .parse()
                .map_err(|e| Error::config(format!("Invalid {}: {}", PORT_ENV, e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        dirs::config_dir()
            .map(|dir| dir.join("building-records").join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Reject limits that would make every upload fail
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("server.port must be non-zero"));
        }
        if self.server.max_upload_size == 0 {
            return Err(Error::config("server.max_upload_size must be non-zero"));
        }
        if self.ingest.max_source_size == 0 || self.ingest.max_entry_size == 0 {
            return Err(Error::config("ingest size limits must be non-zero"));
        }
        if self.ingest.max_archive_entries == 0 {
            return Err(Error::config("ingest.max_archive_entries must be non-zero"));
        }
        if self.ingest.max_depth == 0 {
            return Err(Error::config("ingest.max_depth must be non-zero"));
        }
        if self.export.filename_prefix.is_empty() {
            return Err(Error::config("export.filename_prefix must not be empty"));
        }
        if StrftimeItems::new(&self.export.timestamp_format).any(|item| item == Item::Error) {
            return Err(Error::config(format!(
                "export.timestamp_format '{}' is not a valid strftime format",
                self.export.timestamp_format
            )));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Bounds applied while reading sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Largest accepted uploaded file in bytes (default: 50MB)
    pub max_source_size: u64,
    /// Largest accepted uncompressed archive entry in bytes (default: 50MB)
    pub max_entry_size: u64,
    /// Most entries read from one archive
    pub max_archive_entries: usize,
    /// Deepest element nesting accepted in a document
    pub max_depth: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_source_size: 50 * 1024 * 1024,
            max_entry_size: 50 * 1024 * 1024,
            max_archive_entries: 10_000,
            max_depth: crate::extraction::DEFAULT_MAX_DEPTH,
        }
    }
}

/// CSV export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Download filename prefix
    pub filename_prefix: String,
    /// chrono format string for the filename timestamp
    pub timestamp_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_prefix: "building_records".to_string(),
            timestamp_format: "%Y%m%d_%H%M%S".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.export.filename_prefix, "building_records");
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[ingest]\nmax_archive_entries = 5\n"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.ingest.max_archive_entries, 5);
        assert_eq!(config.ingest.max_depth, crate::extraction::DEFAULT_MAX_DEPTH);
        assert_eq!(config.export.timestamp_format, "%Y%m%d_%H%M%S");
    }

    #[test]
    fn test_load_rejects_invalid_limits() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ingest]\nmax_depth = 0\n").unwrap();
        assert!(matches!(AppConfig::load(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_invalid_timestamp_format() {
        let mut config = AppConfig::default();
        config.export.timestamp_format = "%Y%Q".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(matches!(AppConfig::load(file.path()), Err(Error::Config(_))));
    }
}
