//! Error types for the minimization engine.

use thiserror::Error;

/// Main error type for core engine operations.
#[derive(Debug, Error)]
pub enum ReqMinError {
    #[error("request transport failed: {details}")]
    Transport { details: String },

    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("body parse failed: {reason}")]
    BodyParse { reason: String },

    #[error("invalid configuration: {component} - {reason}")]
    InvalidConfig { component: String, reason: String },

    #[error("baseline probe never produced a usable response")]
    BaselineUnreachable,

    #[error("round budget ({max_rounds}) exhausted before convergence")]
    BudgetExhausted { max_rounds: u32 },
}

impl ReqMinError {
    pub fn transport(details: impl Into<String>) -> Self {
        Self::Transport {
            details: details.into(),
        }
    }

    pub fn body_parse(reason: impl Into<String>) -> Self {
        Self::BodyParse {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// True for failures where retrying the same probe might succeed, as
    /// opposed to a caller mistake that will fail every time.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Timeout { .. } => true,
            Self::BaselineUnreachable => true,
            Self::BodyParse { .. } => false,
            Self::InvalidConfig { .. } => false,
            Self::BudgetExhausted { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReqMinError>;
