//! Application configuration management with security considerations.
//!
//! This module handles all configuration values required by the site server.
//! Sensitive fields are marked and must never be logged.

use envconfig::Envconfig;
use std::sync::OnceLock;

use crate::models::analytics::Environment;

/// Application configuration loaded from environment variables.
///
/// # Security Requirements
/// - All `SENSITIVE` fields must be stored securely
/// - Never log or expose sensitive values
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Database host value (NON-SENSITIVE)
    /// Example: "sqlite:data/site.db"
    pub db_host: String,

    /// 🔒 SENSITIVE: Database password to encrypt SQLite data (prod only)
    #[envconfig(default = "")]
    pub db_pass_encrypt: String,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(default = "localhost")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(default = "8080")]
    pub web_server_port: u16,

    /// Path to SSL private key file (SENSITIVE PATH)
    #[envconfig(default = "server.key")]
    pub private_key_path: String,

    /// Path to SSL certificate file (NON-SENSITIVE)
    #[envconfig(default = "server.crt")]
    pub certificate_path: String,

    /// Directory holding the built single page site (NON-SENSITIVE)
    #[envconfig(default = "web/dist")]
    pub static_dir: String,

    /// Origin allowed to post tracking events (NON-SENSITIVE)
    #[envconfig(default = "http://localhost:3000")]
    pub allowed_origin: String,

    /// 🔒 SENSITIVE: Shared secret the Admin console sends in `X-Admin-Pin`
    pub admin_pin: String,

    /// 🔒 SENSITIVE: Logfire write token. When absent the external metrics
    /// sink stays disabled.
    pub logfire_token: Option<String>,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// The analytics partition this process writes to.
    ///
    /// Derived once from the configured env; callers pass the value along
    /// instead of reading the config again.
    pub fn environment(&self) -> Environment {
        Environment::from_is_local(!self.is_prod())
    }

    /// Gets the appropriate protocol (HTTP/HTTPS) based on environment
    pub fn web_server_protocol(&self) -> String {
        if self.is_prod() {
            return "https".into();
        }
        "http".into()
    }

    /// Constructs the complete base URL for the application
    pub fn base_url(&self) -> String {
        if self.is_prod() {
            return format!("{}://{}", self.web_server_protocol(), self.web_server_host);
        }

        format!(
            "{protocol}://{host}:{port}",
            protocol = self.web_server_protocol(),
            host = self.web_server_host,
            port = self.web_server_port
        )
    }

    pub fn metrics_sink_enabled(&self) -> bool {
        self.logfire_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }
}

/// Global application configuration, filled once by [`init_config`].
pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Loads the configuration from the environment and stores it in [`APP_CONFIG`].
pub async fn init_config() -> anyhow::Result<()> {
    let app_config = AppConfig::init_from_env()
        .map_err(|e| anyhow::anyhow!("failed to load app config from env: {e}"))?;

    APP_CONFIG
        .set(app_config)
        .map_err(|_| anyhow::anyhow!("app config was already initialized"))
}

#[cfg(test)]
pub(crate) fn test_config(env: &str) -> AppConfig {
    AppConfig {
        env: env.into(),
        db_host: "sqlite::memory:".into(),
        db_pass_encrypt: String::new(),
        web_server_host: "localhost".into(),
        web_server_port: 8080,
        private_key_path: "server.key".into(),
        certificate_path: "server.crt".into(),
        static_dir: "web/dist".into(),
        allowed_origin: "http://localhost:3000".into(),
        admin_pin: "4321".into(),
        logfire_token: None,
    }
}
