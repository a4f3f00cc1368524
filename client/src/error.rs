//! Error types for the booking backend client

use thiserror::Error;

/// Errors that can occur when talking to the booking backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, TLS, timeout)
    #[error("{0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    ///
    /// `message` is the backend's `error` field verbatim, or the operation's
    /// fallback message when the body carried none.
    #[error("{message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message to show the user
        message: String,
    },

    /// A 2xx response whose body could not be decoded
    #[error("Response parsing failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of a rejection, if the backend answered at all
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }
}
