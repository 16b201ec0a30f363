use thiserror::Error;

/// Errors that can abort a run before or after the engine does its work.
/// Per-request failures stay inside `ReportEntry` and never reach here.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("report error: {0}")]
    Report(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] reqmin_core::ReqMinError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl CliError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    pub fn archive(reason: impl Into<String>) -> Self {
        Self::Archive(reason.into())
    }

    pub fn report(reason: impl Into<String>) -> Self {
        Self::Report(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
