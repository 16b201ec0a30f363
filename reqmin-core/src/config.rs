//! Typed configuration consumed by the core components.
//!
//! Parsing a YAML/JSON file into these types is an ambient concern that
//! lives in the CLI crate; everything here only needs `serde::Deserialize`
//! so that crate can do the parsing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Outbound requests per second, shared across all workers. `None` means unlimited.
    pub requests_per_second: Option<f64>,
    /// Worker-pool size enforced by the orchestrator.
    pub max_concurrent: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: None,
            max_concurrent: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-request timeout, in seconds. Keyed `timeout` in config files.
    pub timeout: f64,
    pub proxies: HashMap<String, String>,
    pub verify_tls: bool,
    pub rate_limit: RateLimitConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: 20.0,
            proxies: HashMap::new(),
            verify_tls: true,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderMinConfig {
    pub enabled: bool,
    /// Lowercased header names that are always sent and never tried for removal.
    pub protected: Vec<String>,
    /// Lowercased header names that are never sent, in any probe.
    pub ignore: Vec<String>,
    /// When non-empty, only headers whose name matches one of these patterns are candidates.
    pub candidate_regex: Vec<String>,
}

impl Default for HeaderMinConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            protected: vec!["host".to_string(), "cookie".to_string()],
            ignore: vec!["content-length".to_string()],
            candidate_regex: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BodyTypeConfig {
    Auto,
    Json,
    Form,
    Raw,
}

impl Default for BodyTypeConfig {
    fn default() -> Self {
        Self::Auto
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BodyMinConfig {
    pub enabled: bool,
    pub body_type: BodyTypeConfig,
    /// Top-level keys that are always sent and never tried for removal.
    pub protected_keys: Vec<String>,
    /// When non-empty, only candidates under these top-level keys are considered.
    pub only_keys: Vec<String>,
    /// Candidates whose value is already empty are skipped rather than probed.
    pub treat_empty_as_absent: bool,
}

impl Default for BodyMinConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            body_type: BodyTypeConfig::Auto,
            protected_keys: Vec::new(),
            only_keys: Vec::new(),
            treat_empty_as_absent: true,
        }
    }
}

/// The two reduction phases, in the order they should run.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReductionPhase {
    Headers,
    Body,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MinimizationConfig {
    pub headers: HeaderMinConfig,
    pub body: BodyMinConfig,
    pub order: Vec<ReductionPhase>,
}

impl Default for MinimizationConfig {
    fn default() -> Self {
        Self {
            headers: HeaderMinConfig::default(),
            body: BodyMinConfig::default(),
            order: vec![ReductionPhase::Headers, ReductionPhase::Body],
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComparatorLogic {
    And,
    Or,
}

impl Default for ComparatorLogic {
    fn default() -> Self {
        Self::And
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ComparatorConfig {
    pub status_code: bool,
    pub length_check: bool,
    pub length_tolerance: f64,
    pub need_all: Vec<String>,
    pub need_any: Vec<String>,
    pub regex: Vec<String>,
    pub logic: ComparatorLogic,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            status_code: true,
            length_check: false,
            length_tolerance: 0.05,
            need_all: Vec::new(),
            need_any: Vec::new(),
            regex: Vec::new(),
            logic: ComparatorLogic::And,
        }
    }
}

/// Pre-minimization selection, applied once before the orchestrator runs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    pub methods: Vec<String>,
    pub hosts: Vec<String>,
    pub url_regex: Vec<String>,
    pub index_range: Option<(usize, usize)>,
    pub deduplicate_identical: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub include_urls: Vec<String>,
    pub include_regex: Vec<String>,
}

/// Full configuration for one minimization run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub input_har: String,
    pub report_path: String,
    pub output_har: Option<String>,
    pub filters: FilterConfig,
    pub scope: ScopeConfig,
    pub comparator: ComparatorConfig,
    pub minimization: MinimizationConfig,
    pub client: ClientConfig,
    pub max_rounds_per_request: u32,
    pub update_har_metadata: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_har: String::new(),
            report_path: "min_report.json".to_string(),
            output_har: None,
            filters: FilterConfig::default(),
            scope: ScopeConfig::default(),
            comparator: ComparatorConfig::default(),
            minimization: MinimizationConfig::default(),
            client: ClientConfig::default(),
            max_rounds_per_request: 200,
            update_har_metadata: true,
        }
    }
}
