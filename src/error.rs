//! Error types for the BusTime aggregator application

use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested route is not in the known route set
    #[error("Unknown route: {0}")]
    InvalidRoute(String),

    /// A request batch exceeded the upstream per-request identifier limit.
    /// This is an internal invariant violation, not a caller error.
    #[error("Batch of {requested} identifiers exceeds upstream limit of {max}")]
    BatchSizeExceeded { requested: usize, max: usize },

    /// Any wrapped BusTime API failure (network, non-success status, decode)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Network or IO error
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// Address parsing error
    #[error("Address parse error")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        Self::Upstream(error.to_string())
    }
}

/// Convenient alias for Result with application error
pub type Result<T> = std::result::Result<T, AppError>;
