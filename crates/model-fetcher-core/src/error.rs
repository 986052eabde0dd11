//! Error Types
//!
//! Typed failures for the profile store, the fetch client and the model list
//! helpers. Nothing here is fatal: every variant is recoverable by the user
//! fixing a key, an endpoint, or a file and trying again.

use crate::models::ModelRecord;

/// Outcome of a single model list fetch.
pub type FetchResult = Result<Vec<ModelRecord>, FetchError>;

/// Result type for profile store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ── Profile store ───────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file exists but could not be read, parsed or written.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Profile already exists: {0}")]
    DuplicateName(String),

    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}

impl StoreError {
    pub(crate) fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{}: {}", context, err))
    }
}

// ── Fetch client ────────────────────────────────────────────────────────────

/// Classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// HTTP 401
    Unauthorized,
    /// HTTP 404
    NotFound,
    /// HTTP 500..=599
    ServerError(u16),
    /// Any other non-200 status
    UnexpectedStatus(u16),
    /// Timeout, DNS failure, refused connection, broken transfer
    NetworkError,
    /// Body is not JSON or does not have the expected shape
    ParseError,
    /// Base URL is not an absolute http(s) URL
    InvalidUrl,
}

impl ErrorKind {
    /// Map a non-200 HTTP status to its kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Unauthorized,
            404 => ErrorKind::NotFound,
            500..=599 => ErrorKind::ServerError(status),
            other => ErrorKind::UnexpectedStatus(other),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ErrorKind::Unauthorized => Some(401),
            ErrorKind::NotFound => Some(404),
            ErrorKind::ServerError(code) | ErrorKind::UnexpectedStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// A classified fetch failure with a human readable message and a hint on
/// what the user should check next.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub kind: ErrorKind,
    pub message: String,
    pub hint: &'static str,
}

impl FetchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            hint: default_hint(kind),
        }
    }

    /// Error for a non-200 response from `endpoint`.
    pub fn from_status(status: u16, endpoint: &str) -> Self {
        let kind = ErrorKind::from_status(status);
        let message = match kind {
            ErrorKind::Unauthorized => "Authentication failed: API key is invalid or missing".to_string(),
            ErrorKind::NotFound => format!("Endpoint does not exist: {}", endpoint),
            ErrorKind::ServerError(code) => format!("Server error: status code {}", code),
            _ => format!("HTTP error: status code {}", status),
        };
        Self::new(kind, message)
    }

    /// Error for a transport-level failure. Timeouts get their own hint.
    pub fn network(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self {
                kind: ErrorKind::NetworkError,
                message: format!("Request timed out: no response within {} seconds", timeout_secs),
                hint: "check your network connection",
            }
        } else if err.is_connect() {
            Self {
                kind: ErrorKind::NetworkError,
                message: format!("Connection error: {}", err),
                hint: "check that the base URL is reachable",
            }
        } else {
            Self::new(ErrorKind::NetworkError, format!("Network request error: {}", err))
        }
    }

    pub fn parse(message: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::ParseError, format!("Failed to parse response: {}", message))
    }

    pub fn invalid_url(url: &str) -> Self {
        Self::new(ErrorKind::InvalidUrl, format!("Invalid base URL: {:?}", url))
    }
}

fn default_hint(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Unauthorized => "check your API key",
        ErrorKind::NotFound => "check that the base URL and endpoint path are correct",
        ErrorKind::ServerError(_) => "the server has a problem, try again later",
        ErrorKind::InvalidUrl => "use an absolute http:// or https:// URL",
        _ => "check the base URL and your network",
    }
}

// ── Fetch task ──────────────────────────────────────────────────────────────

/// Returned when a fetch is started while another one is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("A fetch is already in progress")]
pub struct FetchBusy;

// ── Export ──────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No models to export")]
    Empty,

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}
