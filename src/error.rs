//! Error Handling Module
//!
//! A single error type is shared by configuration, transport and the vendor
//! adapters. The binary maps it to an exit status via [`SgptError::category`].
//!
//! # Example
//!
//! ```rust
//! use sgpt::error::{ErrorCategory, SgptError};
//!
//! let error = SgptError::api_error(404, "model not found");
//! assert_eq!(error.category(), ErrorCategory::ApiRequestFailed);
//! assert_eq!(error.status(), Some(404));
//! ```

use thiserror::Error;

/// Coarse classification of [`SgptError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected before any network call was attempted.
    InvalidConfiguration,
    /// The adapter has no tested encoding for the requested model.
    UnsupportedModel,
    /// Network failure, timeout, or non-2xx vendor response.
    ApiRequestFailed,
    /// The vendor answered 2xx but produced nothing usable.
    NoResponseGenerated,
    /// Local file or output sink failure.
    Io,
    /// The run was interrupted.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum SgptError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("API request failed: {message}")]
    ApiRequestFailed {
        /// HTTP status, `None` when no response was received.
        status: Option<u16>,
        message: String,
    },

    #[error("no response generated: {0}")]
    NoResponseGenerated(String),

    #[error("failed to read {kind} file {path}: {source}")]
    MediaRead {
        kind: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input: {0}")]
    Input(#[source] std::io::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("request cancelled")]
    Cancelled,
}

impl SgptError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Error for a non-2xx response.
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Error for a request that never produced a response (connect, TLS, timeout).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status: None,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfiguration(_) => ErrorCategory::InvalidConfiguration,
            Self::UnsupportedModel(_) => ErrorCategory::UnsupportedModel,
            Self::ApiRequestFailed { .. } => ErrorCategory::ApiRequestFailed,
            Self::NoResponseGenerated(_) => ErrorCategory::NoResponseGenerated,
            Self::MediaRead { .. } | Self::Input(_) | Self::Output(_) => ErrorCategory::Io,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// HTTP status carried by an API failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiRequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Process exit status the CLI reports for this error.
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Cancelled => 130,
            _ => 1,
        }
    }
}

impl From<reqwest::Error> for SgptError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::api_error(status.as_u16(), err.to_string()),
            None => Self::transport(err.to_string()),
        }
    }
}
