use std::sync::Once;

use serde_json::{Map, Value};

use crate::value::stringify;

/// How a driver wants its records written.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "sluice_config=trace").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Take the filter from the `log_level` entry of a system config, if set.
    pub fn from_system(system: &Map<String, Value>) -> Self {
        let env_filter = system
            .get("log_level")
            .map(stringify)
            .filter(|level| !level.is_empty());
        Self { env_filter, ..Self::default() }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// The filter to install: the configured one, then `rust_log`, then `warn`.
    /// Config output goes to stdout, so stderr stays quiet unless asked.
    fn resolve_filter(&self, rust_log: Option<String>) -> String {
        self.env_filter
            .clone()
            .or(rust_log)
            .unwrap_or_else(|| "warn".to_string())
    }
}

static INIT: Once = Once::new();

/// Routes `log` records through `env_logger`. Only the first call has any
/// effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(std::env::var("RUST_LOG").ok());
        env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .init();

        log::debug!("logging initialized with filter {:?}", filter);
    });
}
