//! Error types for hdfstools

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A request that reached the transport layer but did not produce a usable answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} answered {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("reading response from {url} failed: {reason}")]
    Body { url: String, reason: String },

    #[error("too many redirects starting at {url}")]
    Redirects { url: String },
}

impl TransportError {
    pub fn url(&self) -> &str {
        match self {
            TransportError::Request { url, .. }
            | TransportError::Status { url, .. }
            | TransportError::Body { url, .. }
            | TransportError::Redirects { url } => url,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    // === Local I/O ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Remote ===
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("No active namenode among {candidates} candidate(s)")]
    NoActiveCoordinator { candidates: usize },

    #[error("Unknown entry type {kind:?} for {path}")]
    UnknownEntryType { path: String, kind: String },

    #[error("Malformed response: {0}")]
    Protocol(String),

    // === Config ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Is this a retryable error?
    ///
    /// Only transport failures are: any of them may mean the request went to a
    /// namenode that is no longer active.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Is this an error that must abort the whole operation?
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::NoActiveCoordinator { .. } | Error::UnknownEntryType { .. }
        )
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
