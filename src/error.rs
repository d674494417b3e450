//! Error types for tracker API calls
//!
//! The client does not distinguish simulated faults from genuine internal
//! errors when deciding to retry; both are plain 5xx responses.

use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum ClientError {
    /// Non-success HTTP status. `message` is the body's `error` field, or
    /// `HTTP error! status: N` when the body carries none.
    Http { status: u16, message: String },

    /// The request never produced a response (connect failure, timeout)
    Network(String),

    /// A success response whose body could not be decoded
    InvalidResponse(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { message, .. } => write!(f, "{}", message),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl StdError for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if err.is_timeout() {
            Self::Network(format!("request timed out: {}", err))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl ClientError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Errors meaning "nothing there" rather than "something broke".
    ///
    /// Collection fetchers turn these into an empty result.
    pub fn is_not_found(&self) -> bool {
        if self.status() == Some(404) {
            return true;
        }
        let message = self.to_string().to_lowercase();
        ["404", "not found", "no transactions"]
            .iter()
            .any(|needle| message.contains(needle))
    }

    /// Whether this is the fault gate's synthetic 500
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Http { message, .. } if message.to_lowercase().contains("simulated"))
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } if *status >= 500 => true,
            _ => {
                let message = self.to_string().to_lowercase();
                ["network", "fetch", "timeout", "500", "internal server", "connection"]
                    .iter()
                    .any(|needle| message.contains(needle))
            }
        }
    }

    /// Text suitable for showing to a user who attempted `operation`
    /// (for example "create wallet").
    pub fn user_message(&self, operation: &str) -> String {
        let message = self.to_string().to_lowercase();

        if message.contains("already exists") {
            return "This wallet address already exists.".to_string();
        }
        if message.contains("simulated") || message.contains("server error") {
            return "Server error occurred. Please try again.".to_string();
        }
        if let Self::Network(detail) = self {
            let detail = detail.to_lowercase();
            if detail.contains("timed out") || detail.contains("timeout") {
                return "Request timed out. Please try again.".to_string();
            }
            return "Network error. Please check your connection and try again.".to_string();
        }
        if message.contains("404") || message.contains("not found") {
            return "Resource not found. Please refresh and try again.".to_string();
        }
        if message.contains("500") || message.contains("internal server") {
            return "Server error. Please try again later.".to_string();
        }

        format!("Failed to {}. Please try again.", operation)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
