//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `EVENTS_URL` — reservation pool base URL; unset means in-process
/// - `ACCOUNT_URL` — ledger base URL; unset means in-process
/// - `NOTIFY_URL` — notification collaborator base URL; unset logs only
/// - `CALLBACK_URL` — orchestrator base URL the pool and ledger post
///   outcome callbacks to; unset means the in-process channel
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub events_url: Option<String>,
    pub account_url: Option<String>,
    pub notify_url: Option<String>,
    pub callback_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            events_url: std::env::var("EVENTS_URL").ok(),
            account_url: std::env::var("ACCOUNT_URL").ok(),
            notify_url: std::env::var("NOTIFY_URL").ok(),
            callback_url: std::env::var("CALLBACK_URL").ok(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            events_url: None,
            account_url: None,
            notify_url: None,
            callback_url: None,
        }
    }
}
