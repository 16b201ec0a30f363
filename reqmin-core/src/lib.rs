//! Engine for replaying recorded HTTP requests and greedily reducing
//! each one to the smallest header/body set that still reproduces the
//! recorded response.
//!
//! This crate is pure engine: archive parsing, config-file loading,
//! report formatting, and the command-line surface all live in the
//! binary crate built on top of it.

pub mod body;
pub mod client;
pub mod comparator;
pub mod config;
pub mod error;
pub mod minimizer;
pub mod model;
pub mod orchestrator;
pub mod rate_limiter;

pub use config::Config;
pub use error::{ReqMinError, Result};
pub use model::{BodyKind, MinimizationResult, ProcessedRequest, ReportEntry, RequestData, ResponseSnapshot};
pub use orchestrator::{to_report_entry, Orchestrator};
