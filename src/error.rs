//! Error types for the inbox-watch crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized for logging - see [`Error::category`].
//!
//! Field extraction from notification HTML never produces an [`Error`]: a missing or
//! malformed field degrades to `None` or its sentinel string. These errors surface only
//! when the lower-level operations are called directly.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing or interpreting notification data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid email address format.
    #[error("invalid email format: {email}")]
    InvalidEmailFormat {
        /// The invalid email address.
        email: String,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Date normalization errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Month name is not one of the twelve German month names.
    #[error("unknown German month name '{month}'")]
    UnknownMonth {
        /// The month name as it appeared in the text.
        month: String,
    },

    /// Day does not exist in the resolved month and year.
    #[error("invalid date: day {day} of month {month} in {year}")]
    InvalidDate {
        /// Day of month.
        day: u32,
        /// Month ordinal (1-12).
        month: u32,
        /// Resolved year.
        year: i32,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Message body errors (malformed content won't change)
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to parse email message.
    #[error("failed to parse email")]
    ParseEmail {
        /// The underlying parse error.
        #[source]
        source: mailparse::MailParseError,
    },

    /// Failed to extract email body.
    #[error("failed to extract email body")]
    ExtractBody {
        /// The underlying parse error.
        #[source]
        source: mailparse::MailParseError,
    },

    /// Provider body data is not valid base64url or not UTF-8.
    #[error("failed to decode message body: {message}")]
    DecodeBody {
        /// Description of the decoding failure.
        message: String,
    },
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might succeed on retry.
    ///
    /// Every error of this crate stems from its input, so retrying with the same input
    /// never helps. The method exists so handler shells can treat these errors uniformly
    /// with their own network errors.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::InvalidEmailFormat { .. }
            | Error::InvalidConfig { .. }
            | Error::UnknownMonth { .. }
            | Error::InvalidDate { .. }
            | Error::ParseEmail { .. }
            | Error::ExtractBody { .. }
            | Error::DecodeBody { .. } => false,
        }
    }

    /// Returns the error category for metrics/logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidEmailFormat { .. } | Error::InvalidConfig { .. } => {
                ErrorCategory::Configuration
            }

            Error::UnknownMonth { .. } | Error::InvalidDate { .. } => ErrorCategory::Date,

            Error::ParseEmail { .. } | Error::ExtractBody { .. } | Error::DecodeBody { .. } => {
                ErrorCategory::Parse
            }
        }
    }
}

/// Error categories for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or validation errors.
    Configuration,
    /// Date text that cannot be turned into a calendar date.
    Date,
    /// Email parsing or decoding errors.
    Parse,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Date => write!(f, "date"),
            ErrorCategory::Parse => write!(f, "parse"),
        }
    }
}
