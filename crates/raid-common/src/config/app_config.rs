//! Application configuration structs
//!
//! Layered loading: built-in defaults, then `config/default.toml`, then
//! `config/{env}.toml`, then `RAIDBOT__*` environment variables
//! (`RAIDBOT__STORE__BACKEND=redis`).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, File};
use raid_core::Snowflake;
use serde::Deserialize;

const ENV_PREFIX: &str = "RAIDBOT";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub platform: PlatformConfig,
    pub store: StoreConfig,
    pub schedule: ScheduleConfig,
    /// Emoji markup keyed by role or class name
    #[serde(default)]
    pub emoji: HashMap<String, String>,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

/// HTTP listener for health checks and interaction ingress
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Chat platform bridge
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the bridge sidecar
    pub bridge_url: String,
    pub bot_user_id: Snowflake,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PlatformConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Redis,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Redis => "redis",
            Self::Memory => "memory",
        }
    }
}

/// Event store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Folder for the file backend
    #[serde(default = "default_store_folder")]
    pub folder: PathBuf,
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Whether maintenance sweeps run on their own task or through the command queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceMode {
    #[default]
    Direct,
    Queued,
}

/// Timezone and maintenance settings
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// IANA timezone name, e.g. `America/New_York`
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_maintenance_interval")]
    pub maintenance_interval_secs: u64,
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: i64,
    #[serde(default)]
    pub maintenance_mode: MaintenanceMode,
}

impl ScheduleConfig {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidValue("schedule.timezone", self.timezone.clone()))
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs)
    }

    pub fn expiry(&self) -> chrono::Duration {
        chrono::Duration::hours(self.expiry_hours)
    }
}

// Default value functions
fn default_app_name() -> String {
    "raid-bot".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_store_folder() -> PathBuf {
    PathBuf::from("./data")
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_maintenance_interval() -> u64 {
    3600
}

fn default_expiry_hours() -> i64 {
    48
}

/// One year
const MAX_EXPIRY_HOURS: i64 = 24 * 366;

impl AppConfig {
    /// Load configuration from files and environment variables
    ///
    /// # Errors
    /// Returns an error if a required key is missing or a value does not parse
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let env = std::env::var(format!("{ENV_PREFIX}__APP__ENV"))
            .unwrap_or_else(|_| Environment::Development.as_str().to_string());

        let builder = Self::defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML string layered over the defaults (tests, tooling)
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = Self::defaults(Config::builder())?
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(builder
            .set_default("app.name", default_app_name())?
            .set_default("app.env", Environment::Development.as_str())?
            .set_default("server.host", default_host())?
            .set_default("server.port", 8080)?
            .set_default("platform.bridge_url", "http://127.0.0.1:8090")?
            .set_default("platform.bot_user_id", "0")?
            .set_default("store.backend", "file")?
            .set_default("schedule.timezone", default_timezone())?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.schedule.tz()?;
        if self.store.backend == StoreBackend::Redis && self.store.redis_url.is_none() {
            return Err(ConfigError::MissingVar("store.redis_url"));
        }
        if self.schedule.maintenance_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "schedule.maintenance_interval_secs",
                "0".to_string(),
            ));
        }
        if !(1..=MAX_EXPIRY_HOURS).contains(&self.schedule.expiry_hours) {
            return Err(ConfigError::InvalidValue(
                "schedule.expiry_hours",
                self.schedule.expiry_hours.to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}
