//! Search filter expressions for the mail provider's search endpoint.
//!
//! [`SearchFilter`] accumulates clauses in insertion order and joins them with single
//! spaces. It performs no validation: duplicate or conflicting clauses are kept and the
//! backend's own grammar decides how they combine.
//!
//! # Example
//!
//! ```
//! use inbox_watch::SearchFilter;
//!
//! let query = SearchFilter::new()
//!     .from_address("a@b.com")
//!     .subject("X", true)
//!     .build();
//!
//! assert_eq!(query, r#"from:a@b.com subject:"X""#);
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// A point in time that can be written as integer epoch seconds.
///
/// Naive values are interpreted as UTC; a bare date means midnight UTC.
pub trait EpochSeconds {
    /// Returns seconds since the Unix epoch.
    fn epoch_seconds(&self) -> i64;
}

impl EpochSeconds for i64 {
    fn epoch_seconds(&self) -> i64 {
        *self
    }
}

impl<Tz: TimeZone> EpochSeconds for DateTime<Tz> {
    fn epoch_seconds(&self) -> i64 {
        self.timestamp()
    }
}

impl EpochSeconds for NaiveDateTime {
    fn epoch_seconds(&self) -> i64 {
        self.and_utc().timestamp()
    }
}

impl EpochSeconds for NaiveDate {
    fn epoch_seconds(&self) -> i64 {
        self.and_time(NaiveTime::MIN).and_utc().timestamp()
    }
}

/// Builder for a mail search expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    clauses: Vec<String>,
}

impl SearchFilter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `from:` clause.
    #[must_use]
    pub fn from_address(self, email: impl AsRef<str>) -> Self {
        self.push(format!("from:{}", email.as_ref()))
    }

    /// Adds a `subject:` clause.
    ///
    /// With `exact` the text is quoted so the backend matches it as a literal phrase;
    /// otherwise it is passed as an unquoted term.
    #[must_use]
    pub fn subject(self, text: impl AsRef<str>, exact: bool) -> Self {
        let text = text.as_ref();
        if exact {
            self.push(format!("subject:\"{text}\""))
        } else {
            self.push(format!("subject:{text}"))
        }
    }

    /// Adds an `after:` clause with the instant as epoch seconds.
    #[must_use]
    pub fn after(self, instant: impl EpochSeconds) -> Self {
        self.push(format!("after:{}", instant.epoch_seconds()))
    }

    /// Adds a `before:` clause with the instant as epoch seconds.
    #[must_use]
    pub fn before(self, instant: impl EpochSeconds) -> Self {
        self.push(format!("before:{}", instant.epoch_seconds()))
    }

    /// Adds a `has:attachment` clause.
    #[must_use]
    pub fn has_attachment(self) -> Self {
        self.push("has:attachment".to_owned())
    }

    /// Adds a `filename:` clause.
    #[must_use]
    pub fn filename_matches(self, pattern: impl AsRef<str>) -> Self {
        self.push(format!("filename:{}", pattern.as_ref()))
    }

    /// Returns the accumulated clauses in insertion order.
    #[must_use]
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    /// Joins all clauses with a single space.
    #[must_use]
    pub fn build(&self) -> String {
        self.clauses.join(" ")
    }

    fn push(mut self, clause: String) -> Self {
        self.clauses.push(clause);
        self
    }
}

impl std::fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.build())
    }
}
