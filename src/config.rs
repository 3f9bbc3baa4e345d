//! Client configuration.
//!
//! Values are resolved in this order:
//! 1. Environment variables (`DUB_STUDIO_*`)
//! 2. TOML config file (`<config_dir>/dub-studio/config.toml`)
//! 3. Compiled defaults

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_URL: &str = "DUB_STUDIO_API_URL";
pub const ENV_POLL_INTERVAL: &str = "DUB_STUDIO_POLL_INTERVAL_SECS";
pub const ENV_SESSION_FILE: &str = "DUB_STUDIO_SESSION_FILE";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024 * 1024;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub max_upload_bytes: u64,
    pub request_timeout: Duration,
    pub session_file: PathBuf,
}

/// On-disk shape; every key is optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    poll_interval_secs: Option<u64>,
    max_upload_bytes: Option<u64>,
    request_timeout_secs: Option<u64>,
    session_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            session_file: default_session_file(),
        }
    }
}

impl AppConfig {
    /// Load from the platform config file (if any) and the environment.
    pub fn load() -> Result<Self> {
        let file = match default_config_file() {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "Loading config file");
                Some(read_file_config(&path)?)
            }
            _ => None,
        };
        let mut config = Self::from_file_config(file.unwrap_or_default())?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from an explicit TOML file, ignoring the environment.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_file_config(read_file_config(path)?)
    }

    fn from_file_config(file: FileConfig) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = file.api_base_url {
            config.api_base_url = normalize_base_url(&url)?;
        }
        if let Some(secs) = file.poll_interval_secs {
            config.poll_interval = poll_interval_from_secs(secs)?;
        }
        if let Some(bytes) = file.max_upload_bytes {
            config.max_upload_bytes = bytes;
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = request_timeout_from_secs(secs)?;
        }
        if let Some(path) = file.session_file {
            config.session_file = path;
        }
        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = normalize_base_url(&url)?;
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("{} must be a whole number of seconds", ENV_POLL_INTERVAL))
            })?;
            self.poll_interval = poll_interval_from_secs(secs)?;
        }
        if let Some(path) = lookup(ENV_SESSION_FILE) {
            self.session_file = PathBuf::from(path);
        }
        Ok(())
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {:?}: {}", path, e)))
}

fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "API URL must start with http:// or https://, got '{}'",
            url
        )));
    }
    Ok(trimmed.to_string())
}

fn poll_interval_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::Config("Poll interval must be at least 1 second".to_string()));
    }
    Ok(Duration::from_secs(secs))
}

fn request_timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::Config("Request timeout must be at least 1 second".to_string()));
    }
    Ok(Duration::from_secs(secs))
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dub-studio").join("config.toml"))
}

fn default_session_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("dub-studio").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("./dub-studio-session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_service_contract() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024 * 1024);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_base_url = \"https://dub.example.com/\"\npoll_interval_secs = 2\nsession_file = \"/tmp/s.json\""
        )
        .unwrap();

        let config = AppConfig::from_path(file.path()).unwrap();
        assert_eq!(config.api_base_url, "https://dub.example.com");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.session_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AppConfig::from_file_config(FileConfig {
            api_base_url: Some("http://file.example".to_string()),
            ..Default::default()
        })
        .unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://env.example/"),
            (ENV_POLL_INTERVAL, "5"),
        ]
        .into_iter()
        .collect();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api_base_url, "http://env.example");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|key| (key == ENV_POLL_INTERVAL).then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = config
            .apply_env(|key| (key == ENV_API_URL).then(|| "localhost:8000".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = 0").unwrap();
        let err = AppConfig::from_path(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = 10").unwrap();
        let config = AppConfig::from_path(file.path()).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs = \"soon\"").unwrap();
        let err = AppConfig::from_path(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
