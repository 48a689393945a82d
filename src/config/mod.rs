//! Configuration module for the outreach backend.
//!
//! All configuration is loaded from environment variables (optionally via `.env`)
//! with sensible defaults. The admin password is the one value with no default.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared admin secret; startup refuses to continue without it
    pub admin_password: Option<String>,
    /// `memory`, `sqlite:<path>` or `redis://...`
    pub store_url: String,
    /// Directory uploaded images are written under
    pub upload_dir: PathBuf,
    /// Public URL prefix the upload directory is served at
    pub public_media_url: String,
    pub max_upload_bytes: usize,
    pub session_ttl: Duration,
    /// Mark the session cookie `Secure` (production only)
    pub secure_cookies: bool,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

/// A malformed configuration value.
#[derive(Debug)]
pub struct ConfigError(String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConfigError {}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    let raw = var_or(name, default);
    raw.parse()
        .map_err(|_| ConfigError(format!("Invalid {} value: {}", name, raw)))
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let admin_password = env::var("OUTREACH_ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty());

        let log_format = match var_or("OUTREACH_LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError(format!(
                    "Invalid OUTREACH_LOG_FORMAT value: {} (expected text or json)",
                    other
                )))
            }
        };

        Ok(Self {
            admin_password,
            store_url: var_or("OUTREACH_STORE_URL", "sqlite:./data/content.sqlite"),
            upload_dir: var_or("OUTREACH_UPLOAD_DIR", "./data/uploads").into(),
            public_media_url: var_or("OUTREACH_PUBLIC_MEDIA_URL", "/media"),
            max_upload_bytes: parse_var("OUTREACH_MAX_UPLOAD_BYTES", "5242880")?,
            session_ttl: Duration::from_secs(parse_var("OUTREACH_SESSION_TTL_SECS", "86400")?),
            secure_cookies: var_or("OUTREACH_ENV", "development").eq_ignore_ascii_case("production"),
            bind_addr: parse_var("OUTREACH_BIND_ADDR", "127.0.0.1:8080")?,
            log_level: var_or("OUTREACH_LOG_LEVEL", "info"),
            log_format,
        })
    }

    /// The admin password, or an error explaining how to set it.
    pub fn require_admin_password(&self) -> Result<&str, ConfigError> {
        self.admin_password.as_deref().ok_or_else(|| {
            ConfigError("OUTREACH_ADMIN_PASSWORD must be set; there is no default".to_string())
        })
    }

    /// Route path the upload directory is mounted at, when the public media URL is
    /// root-relative.
    pub fn media_mount(&self) -> Option<&str> {
        let mount = self.public_media_url.trim_end_matches('/');
        (mount.starts_with('/') && mount.len() > 1).then_some(mount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    /// Tests in this module mutate process-wide environment variables.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: &[&str] = &[
        "OUTREACH_ADMIN_PASSWORD",
        "OUTREACH_STORE_URL",
        "OUTREACH_UPLOAD_DIR",
        "OUTREACH_PUBLIC_MEDIA_URL",
        "OUTREACH_MAX_UPLOAD_BYTES",
        "OUTREACH_SESSION_TTL_SECS",
        "OUTREACH_ENV",
        "OUTREACH_BIND_ADDR",
        "OUTREACH_LOG_LEVEL",
        "OUTREACH_LOG_FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = Config::from_env().unwrap();

        assert!(config.admin_password.is_none());
        assert!(config.require_admin_password().is_err());
        assert_eq!(config.store_url, "sqlite:./data/content.sqlite");
        assert_eq!(config.upload_dir, PathBuf::from("./data/uploads"));
        assert_eq!(config.media_mount(), Some("/media"));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.session_ttl, Duration::from_secs(24 * 60 * 60));
        assert!(!config.secure_cookies);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_production_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("OUTREACH_ADMIN_PASSWORD", "hunter2");
        env::set_var("OUTREACH_ENV", "production");
        env::set_var("OUTREACH_STORE_URL", "redis://127.0.0.1/");
        env::set_var("OUTREACH_PUBLIC_MEDIA_URL", "https://cdn.example.org/uploads");
        env::set_var("OUTREACH_LOG_FORMAT", "json");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.require_admin_password().unwrap(), "hunter2");
        assert!(config.secure_cookies);
        assert_eq!(config.store_url, "redis://127.0.0.1/");
        assert_eq!(config.media_mount(), None);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_malformed_values_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("OUTREACH_SESSION_TTL_SECS", "a day");

        let err = Config::from_env().unwrap_err();
        clear_env();

        assert!(err.to_string().contains("OUTREACH_SESSION_TTL_SECS"));
    }
}
