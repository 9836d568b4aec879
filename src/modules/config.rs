use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::csrf::{DEFAULT_CSRF_TTL_SECS, MAX_CSRF_TTL_SECS};

/// Path of an optional JSON config file
const CONFIG_PATH_ENV: &str = "T2N_CONFIG";

const DEFAULT_UPSTREAM_URL: &str = "https://api.track.toggl.com/api/v9";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Listen address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Prefix applied to every route and injected into the HTML shell.
    /// Empty means the app is served from the root.
    #[serde(default)]
    pub base_path: String,

    /// Directory holding index.html and the icons
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Toggl API base URL
    #[serde(default = "default_upstream_url")]
    pub upstream_base_url: String,

    /// Upstream request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// CSRF grant lifetime (seconds)
    #[serde(default = "default_csrf_ttl")]
    pub csrf_ttl_secs: i64,

    /// Directory for rolling log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            base_path: String::new(),
            static_dir: default_static_dir(),
            upstream_base_url: default_upstream_url(),
            request_timeout: default_request_timeout(),
            csrf_ttl_secs: default_csrf_ttl(),
            log_dir: None,
        }
    }
}

fn default_port() -> u16 {
    80
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("web")
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_csrf_ttl() -> i64 {
    DEFAULT_CSRF_TTL_SECS
}

impl ServerConfig {
    /// Base path as shown to clients (`/` when served from the root)
    pub fn display_base_path(&self) -> &str {
        if self.base_path.is_empty() {
            "/"
        } else {
            self.base_path.as_str()
        }
    }

    /// Apply environment overrides on top of the current values
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("BASE_PATH") {
            self.base_path = value;
        }
        if let Some(value) = lookup("PORT") {
            self.port = value
                .trim()
                .parse()
                .map_err(|e| format!("Invalid PORT '{}': {}", value, e))?;
        }
        if let Some(value) = lookup("T2N_BIND") {
            self.bind_address = value;
        }
        if let Some(value) = lookup("T2N_STATIC_DIR") {
            self.static_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("T2N_UPSTREAM_URL") {
            self.upstream_base_url = value;
        }
        if let Some(value) = lookup("T2N_REQUEST_TIMEOUT") {
            self.request_timeout = value
                .trim()
                .parse()
                .map_err(|e| format!("Invalid T2N_REQUEST_TIMEOUT '{}': {}", value, e))?;
        }
        if let Some(value) = lookup("T2N_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(value)).filter(|p| !p.as_os_str().is_empty());
        }
        Ok(())
    }

    /// Normalize fields and reject values the server cannot run with
    pub fn finalize(mut self) -> Result<Self, String> {
        self.base_path = normalize_base_path(&self.base_path);
        self.upstream_base_url = self.upstream_base_url.trim_end_matches('/').to_string();
        if self.upstream_base_url.is_empty() {
            return Err("Upstream base URL must not be empty".to_string());
        }
        if !(1..=MAX_CSRF_TTL_SECS).contains(&self.csrf_ttl_secs) {
            return Err(format!(
                "CSRF ttl must be between 1 and {} seconds, got {}",
                MAX_CSRF_TTL_SECS, self.csrf_ttl_secs
            ));
        }
        if self.request_timeout == 0 {
            return Err("Request timeout must be at least 1 second".to_string());
        }
        Ok(self)
    }
}

/// Normalize a base path to either "" or "/segment[/segment...]"
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Read a config file
pub fn load_config_file(path: &Path) -> Result<ServerConfig, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

    serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
}

/// Load server configuration: optional file, then environment overrides
pub fn load_server_config() -> Result<ServerConfig, String> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.is_empty() => load_config_file(Path::new(&path))?,
        _ => ServerConfig::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.finalize()
}
