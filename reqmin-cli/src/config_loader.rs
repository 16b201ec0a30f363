use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};
use crate::logging::LoggingConfig;
use reqmin_core::Config as EngineConfig;

/// Top-level file shape: the engine's config plus the ambient logging block.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    #[serde(flatten)]
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Loads a config file, dispatching on extension: `.yaml`/`.yml` parse as
/// YAML, everything else (including `.json`) parses as JSON.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::config(format!("cannot read {}: {e}", path.display())))?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );

    if is_yaml {
        serde_yaml::from_str(&text).map_err(|e| CliError::config(format!("invalid YAML in {}: {e}", path.display())))
    } else {
        serde_json::from_str(&text).map_err(|e| CliError::config(format!("invalid JSON in {}: {e}", path.display())))
    }
}

/// Applies the handful of settings exposed directly as CLI flags on top of
/// whatever the config file specified, so `--input`/`--report` etc. always
/// win when present.
#[allow(clippy::too_many_arguments)]
pub fn apply_overrides(
    mut config: RunConfig,
    input_har: Option<String>,
    report_path: Option<String>,
    output_har: Option<String>,
    max_concurrent: Option<usize>,
    requests_per_second: Option<f64>,
    log_level: Option<String>,
    log_json: bool,
) -> RunConfig {
    if let Some(input) = input_har {
        config.engine.input_har = input;
    }
    if let Some(report) = report_path {
        config.engine.report_path = report;
    }
    if output_har.is_some() {
        config.engine.output_har = output_har;
    }
    if let Some(max_concurrent) = max_concurrent {
        config.engine.client.rate_limit.max_concurrent = max_concurrent;
    }
    if let Some(rps) = requests_per_second {
        config.engine.client.rate_limit.requests_per_second = Some(rps);
    }
    if let Some(level) = log_level {
        config.logging.level = level;
    }
    if log_json {
        config.logging.json_format = true;
    }
    config
}

pub fn validate(config: &RunConfig) -> Result<()> {
    if config.engine.input_har.is_empty() {
        return Err(CliError::config("input_har is required (set it in the config file or pass --input)"));
    }
    Ok(())
}
