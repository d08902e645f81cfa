use crate::presentation::config::{Environment, LoggingSettings};

const CRATE_TARGET: &str = "colloquy";

/// How the process-wide subscriber is built.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: Environment,
    pub json_format: bool,
    pub level: String,
}

impl TracingConfig {
    pub fn from_settings(settings: &LoggingSettings, environment: Environment) -> Self {
        Self {
            environment,
            json_format: settings.enable_json,
            level: settings.level.clone(),
        }
    }

    /// Filter used when `RUST_LOG` is unset: the configured level everywhere,
    /// with this crate and HTTP tracing at debug.
    pub fn default_directive(&self) -> String {
        format!("{},{}=debug,tower_http=debug", self.level, CRATE_TARGET)
    }
}
