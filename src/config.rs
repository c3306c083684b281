//! Configuration for a pickup-notification handler.
//!
//! Use [`PickupWatchConfigBuilder`] to create a configuration, or start from the DHL
//! preset:
//!
//! ```
//! use inbox_watch::PickupWatchConfig;
//! use std::time::Duration;
//!
//! let config = PickupWatchConfig::builder()
//!     .sender("order-update@amazon.de")
//!     .subject("Ihr Paket kann bei DHL")
//!     .lookback(Duration::from_secs(3600))
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.task_title, "Paket abholen");
//! ```

use crate::error::{Error, Result};
use crate::extractor::LocationStrategy;
use crate::freshness::FreshnessWindow;
use crate::query::SearchFilter;
use chrono::{DateTime, TimeZone};
use email_address::EmailAddress;
use std::time::Duration;

/// Sender of Amazon's DHL pickup notifications.
pub const DHL_PICKUP_SENDER: &str = "order-update@amazon.de";

/// Subject phrase of Amazon's DHL pickup notifications.
pub const DHL_PICKUP_SUBJECT: &str = "Ihr Paket kann bei DHL";

/// Default reminder title.
pub const DEFAULT_TASK_TITLE: &str = "Paket abholen";

/// Default handler name used in failure notifications.
pub const DEFAULT_HANDLER_NAME: &str = "dhl_mail_to_task";

/// Default search lookback.
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(10 * 3600);

/// Configuration for watching a mailbox for pickup notifications.
///
/// Create using [`PickupWatchConfig::builder()`] or [`PickupWatchConfig::dhl_pickup()`].
#[derive(Debug, Clone)]
pub struct PickupWatchConfig {
    /// Sender address the search is restricted to. Stored as a validated `EmailAddress`.
    sender: EmailAddress,
    /// Subject text to search for.
    pub subject: String,
    /// Whether the subject is searched as a literal phrase.
    pub exact_subject: bool,
    /// How far back each run searches.
    pub lookback: Duration,
    /// Freshness window for record dates.
    pub freshness: FreshnessWindow,
    /// Location lookup strategy of the extractor.
    pub location_strategy: LocationStrategy,
    /// Title of the created reminder tasks.
    pub task_title: String,
    /// Name reported in failure notifications.
    pub handler_name: String,
}

impl PickupWatchConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> PickupWatchConfigBuilder {
        PickupWatchConfigBuilder::default()
    }

    /// Returns the preset for Amazon/DHL pickup notifications.
    #[must_use]
    pub fn dhl_pickup() -> Self {
        Self {
            sender: EmailAddress::new_unchecked(DHL_PICKUP_SENDER),
            subject: DHL_PICKUP_SUBJECT.to_owned(),
            exact_subject: true,
            lookback: DEFAULT_LOOKBACK,
            freshness: FreshnessWindow::default(),
            location_strategy: LocationStrategy::default(),
            task_title: DEFAULT_TASK_TITLE.to_owned(),
            handler_name: DEFAULT_HANDLER_NAME.to_owned(),
        }
    }

    /// Returns the sender address as a string slice.
    #[must_use]
    pub fn sender(&self) -> &str {
        self.sender.as_str()
    }

    /// Builds the mail search filter for a run starting at `now`.
    ///
    /// The filter is `from:<sender> subject:<subject> after:<now - lookback>`.
    #[must_use]
    pub fn search_filter<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> SearchFilter {
        let lookback = chrono::Duration::from_std(self.lookback).unwrap_or(chrono::Duration::MAX);
        let after = now.timestamp().saturating_sub(lookback.num_seconds());

        SearchFilter::new()
            .from_address(self.sender())
            .subject(&self.subject, self.exact_subject)
            .after(after)
    }
}

/// Validates an email address format.
fn validate_email(email: &str) -> Result<EmailAddress> {
    EmailAddress::parse_with_options(email, email_address::Options::default()).map_err(|_| {
        Error::InvalidEmailFormat {
            email: email.to_string(),
        }
    })
}

/// Builder for [`PickupWatchConfig`].
#[derive(Debug, Default)]
pub struct PickupWatchConfigBuilder {
    sender: Option<String>,
    subject: Option<String>,
    exact_subject: Option<bool>,
    lookback: Option<Duration>,
    freshness_days: Option<u32>,
    location_strategy: Option<LocationStrategy>,
    task_title: Option<String>,
    handler_name: Option<String>,
}

impl PickupWatchConfigBuilder {
    /// Sets the sender address (required).
    #[must_use]
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Sets the subject text (required).
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets whether the subject is matched as a literal phrase.
    ///
    /// Default is `true`.
    #[must_use]
    pub fn exact_subject(mut self, exact: bool) -> Self {
        self.exact_subject = Some(exact);
        self
    }

    /// Sets how far back each run searches.
    ///
    /// Default is 10 hours.
    #[must_use]
    pub fn lookback(mut self, lookback: Duration) -> Self {
        self.lookback = Some(lookback);
        self
    }

    /// Sets the freshness window in days.
    ///
    /// Default is 1 (today and yesterday).
    #[must_use]
    pub fn freshness_days(mut self, days: u32) -> Self {
        self.freshness_days = Some(days);
        self
    }

    /// Sets the pickup-location lookup strategy.
    #[must_use]
    pub fn location_strategy(mut self, strategy: LocationStrategy) -> Self {
        self.location_strategy = Some(strategy);
        self
    }

    /// Sets the reminder title.
    ///
    /// Default is `Paket abholen`.
    #[must_use]
    pub fn task_title(mut self, title: impl Into<String>) -> Self {
        self.task_title = Some(title.into());
        self
    }

    /// Sets the name reported in failure notifications.
    ///
    /// Default is `dhl_mail_to_task`.
    #[must_use]
    pub fn handler_name(mut self, name: impl Into<String>) -> Self {
        self.handler_name = Some(name.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or invalid.
    pub fn build(self) -> Result<PickupWatchConfig> {
        let sender_raw = self.sender.ok_or_else(|| Error::InvalidConfig {
            message: "sender is required".into(),
        })?;

        let sender = validate_email(&sender_raw)?;

        let subject = self
            .subject
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::InvalidConfig {
                message: "subject is required".into(),
            })?;

        let task_title = self.task_title.unwrap_or_else(|| DEFAULT_TASK_TITLE.to_owned());
        if task_title.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "task title must not be empty".into(),
            });
        }

        Ok(PickupWatchConfig {
            sender,
            subject,
            exact_subject: self.exact_subject.unwrap_or(true),
            lookback: self.lookback.unwrap_or(DEFAULT_LOOKBACK),
            freshness: self
                .freshness_days
                .map(FreshnessWindow::new)
                .unwrap_or_default(),
            location_strategy: self.location_strategy.unwrap_or_default(),
            task_title,
            handler_name: self
                .handler_name
                .unwrap_or_else(|| DEFAULT_HANDLER_NAME.to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_builder_minimal() {
        let config = PickupWatchConfig::builder()
            .sender("order-update@amazon.de")
            .subject("Ihr Paket kann bei DHL")
            .build()
            .unwrap();

        assert_eq!(config.sender(), "order-update@amazon.de");
        assert!(config.exact_subject);
        assert_eq!(config.lookback, DEFAULT_LOOKBACK);
        assert_eq!(config.freshness.lookback_days(), 1);
        assert_eq!(config.location_strategy, LocationStrategy::Structural);
        assert_eq!(config.task_title, "Paket abholen");
        assert_eq!(config.handler_name, "dhl_mail_to_task");
    }

    #[test]
    fn test_builder_full() {
        let config = PickupWatchConfig::builder()
            .sender("no-reply@winsim.de")
            .subject("Rechnung")
            .exact_subject(false)
            .lookback(Duration::from_secs(3600))
            .freshness_days(3)
            .location_strategy(LocationStrategy::TextPattern)
            .task_title("Rechnung ablegen")
            .handler_name("winsim_invoice")
            .build()
            .unwrap();

        assert!(!config.exact_subject);
        assert_eq!(config.lookback, Duration::from_secs(3600));
        assert_eq!(config.freshness.lookback_days(), 3);
        assert_eq!(config.location_strategy, LocationStrategy::TextPattern);
        assert_eq!(config.task_title, "Rechnung ablegen");
        assert_eq!(config.handler_name, "winsim_invoice");
    }

    #[test]
    fn test_builder_missing_sender() {
        let result = PickupWatchConfig::builder().subject("x").build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_builder_missing_or_blank_subject() {
        let result = PickupWatchConfig::builder().sender("a@b.com").build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));

        let result = PickupWatchConfig::builder()
            .sender("a@b.com")
            .subject("   ")
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_builder_invalid_sender() {
        let result = PickupWatchConfig::builder()
            .sender("invalid-email")
            .subject("x")
            .build();
        assert!(matches!(result, Err(Error::InvalidEmailFormat { .. })));
    }

    #[test]
    fn test_builder_empty_title() {
        let result = PickupWatchConfig::builder()
            .sender("a@b.com")
            .subject("x")
            .task_title("")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_dhl_preset_search_filter() {
        let config = PickupWatchConfig::dhl_pickup();
        let now = Utc.with_ymd_and_hms(2023, 11, 15, 8, 13, 20).unwrap();

        assert_eq!(
            config.search_filter(&now).build(),
            "from:order-update@amazon.de subject:\"Ihr Paket kann bei DHL\" after:1700000000"
        );
    }

    #[test]
    fn test_loose_subject_filter() {
        let config = PickupWatchConfig::builder()
            .sender("no-reply@winsim.de")
            .subject("winSIM-Rechnung")
            .exact_subject(false)
            .lookback(Duration::ZERO)
            .build()
            .unwrap();
        let now = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();

        assert_eq!(
            config.search_filter(&now).build(),
            "from:no-reply@winsim.de subject:winSIM-Rechnung after:1700000000"
        );
    }
}
