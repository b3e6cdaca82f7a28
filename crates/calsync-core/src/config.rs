use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{CALENDAR_ROUTE_COMPONENT, DEFAULT_MAX_BODY_BYTES};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Path segment the canonical calendar is served under.
    pub route: String,
    /// Replace merged events with their simplified form.
    pub clean_events: bool,
    /// Reject mismatched or unclosed BEGIN/END pairs.
    pub strict_parsing: bool,
    /// Largest accepted PUT body.
    pub max_body_bytes: usize,
    /// Optional JSON file with events added at startup.
    pub seed_file: Option<String>,
}

impl CalendarConfig {
    /// ## Summary
    /// Checks values the deserializer cannot.
    ///
    /// ## Errors
    /// Returns `ConfigError` for an empty or nested route, or a zero body limit.
    pub fn validate(&self) -> CoreResult<()> {
        if self.route.is_empty() || self.route.contains('/') {
            return Err(CoreError::ConfigError(format!(
                "calendar.route must be a single path segment, got {:?}",
                self.route
            )));
        }
        if self.max_body_bytes == 0 {
            return Err(CoreError::ConfigError(
                "calendar.max_body_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, environment variables and an optional
    /// `config.toml`. Nested keys use `__` in environment variable names
    /// (`CALENDAR__CLEAN_EVENTS=false`).
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating the
    /// configuration fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "debug")?
            .set_default("calendar.route", CALENDAR_ROUTE_COMPONENT)?
            .set_default("calendar.clean_events", true)?
            .set_default("calendar.strict_parsing", false)?
            .set_default("calendar.max_body_bytes", DEFAULT_MAX_BODY_BYTES)?
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.calendar.validate()?;
        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    Settings::load()
}
