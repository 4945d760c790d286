//! Error types for lambda-phage.
//!
//! One enum covers every failure category: settings, I/O, prompting,
//! projects, deployment and filter compilation.

use thiserror::Error;

/// Unified error type for lambda-phage.
///
/// Expected failures are represented here and propagated to the boundary
/// that decides whether they are per-function, per-project or fatal.
#[derive(Error, Debug)]
pub enum AppError {
    /// Settings-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prompt chain errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The operator aborted an interactive prompt chain
    #[error("Cancelled by operator")]
    Cancelled,

    /// Project manifest errors
    #[error("Project error: {0}")]
    Project(String),

    /// Deploy collaborator errors
    #[error("Deploy error: {0}")]
    Deploy(String),

    /// Function name filter did not compile
    #[error("Invalid filter: {0}")]
    Filter(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Filter(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
