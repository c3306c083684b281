//! # inbox-watch
//!
//! Turns DHL pickup notifications received by e-mail into reminder tasks.
//!
//! This crate provides:
//! - Extraction of tracking number, pickup location, due date and item preview from the
//!   HTML of an Amazon/DHL pickup notification
//! - Normalization of German due dates ("Freitag, 10. Januar") to `dd.mm.yyyy`
//! - A freshness predicate and a mail search-filter builder for polling runs
//! - A handler that turns a batch of fetched messages into task events
//!
//! Fetching mail and delivering events is left to the hosting runtime.
//!
//! ## Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use inbox_watch::PickupExtractor;
//!
//! let html = r#"<p>Ihre Tracking-Nummer lautet: JJD000390016890406943</p>
//! <p>ABHOLUNG BIS ZUM
//! Freitag, 10. Januar</p>"#;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
//! let parsed = PickupExtractor::new().extract_at(html, today);
//!
//! assert_eq!(parsed.tracking_number.as_deref(), Some("JJD000390016890406943"));
//! assert_eq!(parsed.due_date.as_deref(), Some("10.01.2026"));
//! assert_eq!(parsed.pickup_location, inbox_watch::ADDRESS_NOT_FOUND);
//! assert_eq!(parsed.preview, inbox_watch::UNKNOWN_ITEM);
//! ```
//!
//! Missing fields never fail extraction. They come back as `None` or as the
//! [`ADDRESS_NOT_FOUND`] and [`UNKNOWN_ITEM`] sentinels.
//!
//! ## Polling
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use inbox_watch::PickupWatchConfig;
//!
//! let config = PickupWatchConfig::dhl_pickup();
//! let now = Utc.with_ymd_and_hms(2023, 11, 15, 8, 13, 20).unwrap();
//!
//! assert_eq!(
//!     config.search_filter(&now).to_string(),
//!     "from:order-update@amazon.de subject:\"Ihr Paket kann bei DHL\" after:1700000000"
//! );
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result`]. Use [`Error::category`] to group failures:
//!
//! ```
//! use chrono::NaiveDate;
//! use inbox_watch::{resolve_german_date, ErrorCategory};
//!
//! let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
//! let error = resolve_german_date(10, "Smarch", today).unwrap_err();
//! assert_eq!(error.category(), ErrorCategory::Date);
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing`. Lookup misses during extraction are logged at debug level
//! with `field` and `step`; each handler run logs one summary at info level.
//!
//! ### Span Naming Convention
//!
//! - `PickupExtractor::extract` - One notification extraction
//! - `PickupHandler::process` - One handler run

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod body;
pub mod config;
pub mod dedup;
pub mod document;
pub mod error;
pub mod events;
pub mod extractor;
pub mod freshness;
pub mod handler;
pub mod locale;
pub mod query;

// Internal modules
mod entities;

// Re-exports for ergonomic API
pub use config::{PickupWatchConfig, PickupWatchConfigBuilder};
pub use email_address::EmailAddress;
pub use error::{Error, ErrorCategory, Result};
pub use events::{ChatNotification, OutputEvent, TaskEvent};
pub use extractor::{
    extract, LocationStrategy, ParsedNotification, PickupExtractor, ADDRESS_NOT_FOUND,
    UNKNOWN_ITEM,
};
pub use freshness::{is_recent, is_recent_at, FreshnessWindow};
pub use handler::{PickupHandler, PickupMessage};
pub use locale::resolve_german_date;
pub use query::SearchFilter;
