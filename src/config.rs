//! Campus events configuration management

use crate::error::{Error, Result};
use crate::events::store::EventStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampusEventsConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Submission workflow configuration
    #[serde(default)]
    pub submission: SubmissionConfig,
}

impl CampusEventsConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::Config("server.host must not be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(Error::Config("server.port must not be 0".to_string()));
        }
        if self.submission.idle_timeout_secs == 0 {
            return Err(Error::Config(
                "submission.idle_timeout_secs must not be 0".to_string(),
            ));
        }
        if let Some(url) = &self.submission.service_url {
            url::Url::parse(url)
                .map_err(|e| Error::Config(format!("submission.service_url: {}", e)))?;
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18790,
            cors_origins: Vec::new(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for storage
    pub base_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: EventStore::default_dir(),
        }
    }
}

/// Submission workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// How long the confirmation stays visible before the workflow resets
    pub confirmation_delay_ms: u64,

    /// Remote catalog receiving submissions; the local store when unset
    pub service_url: Option<String>,

    /// Request timeout for the remote catalog, in seconds
    pub service_timeout_secs: u64,

    /// Drafts untouched this long are closed, in seconds
    pub idle_timeout_secs: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            confirmation_delay_ms: 2000,
            service_url: None,
            service_timeout_secs: 10,
            idle_timeout_secs: 30 * 60,
        }
    }
}

impl SubmissionConfig {
    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }

    pub fn service_timeout(&self) -> Duration {
        Duration::from_secs(self.service_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CampusEventsConfig::default();
        assert_eq!(config.server.port, 18790);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.submission.confirmation_delay(),
            Duration::from_secs(2)
        );
        assert!(config.submission.service_url.is_none());
        assert!(config.storage.base_dir.ends_with("campus-events"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: CampusEventsConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [submission]
            confirmation_delay_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.submission.confirmation_delay(),
            Duration::from_millis(500)
        );
        assert_eq!(config.submission.service_timeout_secs, 10);
        assert_eq!(config.submission.idle_timeout(), Duration::from_secs(1800));
    }

    #[test]
    fn test_validate_rejects_bad_server() {
        let mut config = CampusEventsConfig::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = CampusEventsConfig::default();
        config.server.host = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = CampusEventsConfig::default();
        config.submission.service_url = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = CampusEventsConfig::default();
        config.submission.idle_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            host = "0.0.0.0"
            cors_origins = ["http://localhost:3000"]

            [submission]
            service_url = "http://catalog.campus.edu"
            "#,
        )
        .unwrap();

        let config = CampusEventsConfig::load(&path).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.cors_origins.len(), 1);
        assert_eq!(
            config.submission.service_url.as_deref(),
            Some("http://catalog.campus.edu")
        );
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 0\n").unwrap();
        assert!(matches!(
            CampusEventsConfig::load(&path),
            Err(Error::Config(_))
        ));

        std::fs::write(&path, "[server\n").unwrap();
        assert!(matches!(
            CampusEventsConfig::load(&path),
            Err(Error::Config(_))
        ));

        assert!(matches!(
            CampusEventsConfig::load(&dir.path().join("missing.toml")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let config = CampusEventsConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: CampusEventsConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.storage.base_dir, config.storage.base_dir);
    }
}
