//! The pickup-notification handler.
//!
//! One run takes the messages a mail shell fetched with [`PickupHandler::search_filter`],
//! drops the ones that are too old, extracts each remaining notification and turns it
//! into a reminder task.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use inbox_watch::dedup::InMemorySeen;
//! use inbox_watch::{PickupHandler, PickupMessage, PickupWatchConfig};
//!
//! let handler = PickupHandler::new(PickupWatchConfig::dhl_pickup());
//! let now = Utc.with_ymd_and_hms(2025, 12, 1, 8, 0, 0).unwrap();
//!
//! let html = "<p>Tracking-Nummer lautet: JJD000390016890406943</p>";
//! let messages = vec![
//!     PickupMessage::new("m-1", html).received_at(now),
//!     PickupMessage::new("m-2", html).received_at(now),
//! ];
//!
//! let mut seen = InMemorySeen::new();
//! let tasks = handler.process(&messages, now, &mut seen);
//! assert_eq!(tasks.len(), 1);
//! assert_eq!(tasks[0].title, "Paket abholen");
//! ```

use crate::config::PickupWatchConfig;
use crate::dedup::SeenSet;
use crate::events::{ChatNotification, TaskEvent};
use crate::extractor::PickupExtractor;
use crate::query::SearchFilter;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;
use tracing::{debug, info, instrument};

/// A fetched message handed to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupMessage {
    /// Provider message id.
    pub id: String,
    /// Selected HTML body.
    pub html: String,
    /// Receive time, if the provider reported one.
    pub received_at: Option<DateTime<Utc>>,
}

impl PickupMessage {
    /// Creates a message without receive time.
    #[must_use]
    pub fn new(id: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html: html.into(),
            received_at: None,
        }
    }

    /// Sets the receive time.
    #[must_use]
    pub fn received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = Some(received_at);
        self
    }
}

/// Turns DHL pickup notifications into reminder tasks.
#[derive(Debug, Clone)]
pub struct PickupHandler {
    config: PickupWatchConfig,
    extractor: PickupExtractor,
}

impl PickupHandler {
    /// Creates a handler for `config`.
    #[must_use]
    pub fn new(config: PickupWatchConfig) -> Self {
        let extractor = PickupExtractor::with_location_strategy(config.location_strategy);
        Self { config, extractor }
    }

    /// Returns the handler's configuration.
    #[must_use]
    pub fn config(&self) -> &PickupWatchConfig {
        &self.config
    }

    /// Builds the search filter for a run starting at `now`.
    #[must_use]
    pub fn search_filter<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> SearchFilter {
        self.config.search_filter(now)
    }

    /// Processes one batch of fetched messages.
    ///
    /// Messages with a receive date outside the freshness window are skipped; messages
    /// without one are kept. Each notification is keyed by its tracking number, or by
    /// the message id when none was found, and only first sightings in `seen` produce a
    /// task.
    #[instrument(
        name = "PickupHandler::process",
        skip_all,
        fields(handler = %self.config.handler_name, messages = messages.len())
    )]
    pub fn process(
        &self,
        messages: &[PickupMessage],
        reference_now: DateTime<Utc>,
        seen: &mut dyn SeenSet,
    ) -> Vec<TaskEvent> {
        let today = reference_now.date_naive();
        let mut tasks = Vec::new();
        let mut stale = 0usize;
        let mut duplicates = 0usize;

        for message in messages {
            if let Some(received_at) = message.received_at {
                if !self.config.freshness.is_fresh_at(received_at, today) {
                    debug!(message_id = %message.id, %received_at, "Skipping stale message");
                    stale += 1;
                    continue;
                }
            }

            let parsed = self.extractor.extract_at(&message.html, reference_now);
            let key = parsed.tracking_number.as_deref().unwrap_or(&message.id);

            if !seen.first_sighting(key) {
                debug!(message_id = %message.id, key, "Already handled");
                duplicates += 1;
                continue;
            }

            tasks.push(TaskEvent::new(&self.config.task_title, parsed.task_notes()));
        }

        info!(
            tasks = tasks.len(),
            stale, duplicates, "Processed pickup notifications"
        );

        tasks
    }

    /// Builds the chat notification reporting a failed run.
    #[must_use]
    pub fn failure_notification(&self, error: &dyn Display) -> ChatNotification {
        ChatNotification::new(format!(
            "Error in {}: {error}",
            self.config.handler_name
        ))
        .with_subject(&self.config.handler_name)
    }
}
