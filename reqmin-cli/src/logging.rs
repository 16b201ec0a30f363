use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::error::CliError;

/// Logging configuration, loadable from the same config file as everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base log level (trace, debug, info, warn, error).
    pub level: String,
    /// Emit newline-delimited JSON instead of the human-readable format.
    pub json_format: bool,
    pub include_thread_names: bool,
    pub include_file_info: bool,
    /// Ignored when `json_format` is set.
    pub enable_colors: bool,
    /// Per-module overrides, e.g. `{"reqwest": "warn"}`.
    pub module_levels: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut module_levels = HashMap::new();
        module_levels.insert("reqwest".to_string(), "warn".to_string());
        module_levels.insert("hyper".to_string(), "warn".to_string());

        Self {
            level: "info".to_string(),
            json_format: false,
            include_thread_names: false,
            include_file_info: false,
            enable_colors: true,
            module_levels,
        }
    }
}

/// Initializes the global tracing subscriber. Safe to call once per process;
/// a second call is a no-op rather than a panic.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CliError> {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    for (module, level) in &config.module_levels {
        let directive = format!("{module}={level}");
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| CliError::config(format!("invalid log directive {directive}: {e}")))?,
        );
    }

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_file(config.include_file_info)
            .with_line_number(config.include_file_info)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_names(config.include_thread_names)
            .with_file(config.include_file_info)
            .with_line_number(config.include_file_info)
            .with_ansi(config.enable_colors)
            .boxed()
    };

    let result = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();

    if result.is_err() {
        tracing::debug!("logging already initialized, skipping");
    }

    Ok(())
}
