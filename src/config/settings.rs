use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Current-generation OneSignal API keys carry this prefix.
const API_KEY_PREFIX: &str = "os_v2_";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    pub onesignal: OneSignalConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneSignalConfig {
    /// Provider app identifier.
    #[serde(default)]
    pub app_id: String,
    /// Current-generation REST API key (`os_v2_` prefix).
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Base of the legacy API, used only by the connectivity probe fallback.
    #[serde(default = "default_legacy_api_url")]
    pub legacy_api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_api_url() -> String {
    "https://api.onesignal.com".to_string()
}

fn default_legacy_api_url() -> String {
    "https://onesignal.com/api/v1".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "onesignal-gateway".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("onesignal.api_url", default_api_url())?
            .set_default("onesignal.legacy_api_url", default_legacy_api_url())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables (SERVER_HOST, SERVER_PORT, ...)
            .add_source(Environment::default().separator("_").try_parsing(true));

        // Keys containing underscores collide with the env separator, so the
        // OneSignal variables are mapped explicitly.
        let overrides = [
            ("ONESIGNAL_APP_ID", "onesignal.app_id"),
            ("ONESIGNAL_API_KEY", "onesignal.api_key"),
            ("ONESIGNAL_API_URL", "onesignal.api_url"),
            ("ONESIGNAL_LEGACY_API_URL", "onesignal.legacy_api_url"),
            ("PORT", "server.port"),
        ];
        for (var, key) in overrides {
            if let Ok(value) = env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Credential checks that must fail at startup, never per-request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.onesignal.app_id.trim().is_empty() {
            return Err(ConfigError::Message(
                "ONESIGNAL_APP_ID must be set".to_string(),
            ));
        }
        if self.onesignal.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "ONESIGNAL_API_KEY must be set".to_string(),
            ));
        }
        if !self.onesignal.api_key.starts_with(API_KEY_PREFIX) {
            return Err(ConfigError::Message(format!(
                "ONESIGNAL_API_KEY must be a current-generation key (\"{API_KEY_PREFIX}\" prefix)"
            )));
        }
        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}
