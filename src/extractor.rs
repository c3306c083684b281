//! Field extraction from DHL pickup notifications.
//!
//! The vendor markup is not versioned, so every field is looked up independently and
//! degrades on its own. A missing tracking number or due date becomes `None`; a missing
//! pickup location or item preview becomes a sentinel string that still reads well in
//! a reminder. [`PickupExtractor::extract`] never fails.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use inbox_watch::{PickupExtractor, ADDRESS_NOT_FOUND, UNKNOWN_ITEM};
//!
//! let html = "<p>Ihre Tracking-Nummer lautet: JJD0001</p>\n\
//!             <p>ABHOLUNG BIS ZUM</p>\n<p>Freitag, 10. Januar</p>";
//! let now = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
//!
//! let parsed = PickupExtractor::new().extract_at(html, now);
//! assert_eq!(parsed.tracking_number.as_deref(), Some("JJD0001"));
//! assert_eq!(parsed.due_date.as_deref(), Some("10.01.2026"));
//! assert_eq!(parsed.pickup_location, ADDRESS_NOT_FOUND);
//! assert_eq!(parsed.preview, UNKNOWN_ITEM);
//! ```

use crate::document::{DocumentTree, HtmlDocument, Marker};
use crate::freshness::CalendarDate;
use crate::locale::{format_due_date, resolve_german_date};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Pickup location placeholder when the structural lookup fails.
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

/// Item preview placeholder when the item block cannot be found.
pub const UNKNOWN_ITEM: &str = "Unknown item";

/// Placeholder for absent optional fields in task notes.
const UNKNOWN_FIELD: &str = "unbekannt";

const ITEM_NAME_CLASS: &str = "rio_15_heavy_black";

static TRACKING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Tracking-Nummer lautet:\s*([A-Z0-9]+)").expect("valid regex"));

static DUE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ABHOLUNG BIS ZUM\s+([^,\n]+?)\s*,\s*(\d{1,2})\.\s*(\w+)").expect("valid regex")
});

static LOCATION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)ABHOLORT\s*\n\s*DHL\s*\n\s*(.*?)\s*Öffnungszeiten").expect("valid regex")
});

static LOCATION_MARKER: LazyLock<Marker> =
    LazyLock::new(|| Marker::new("span", Regex::new("ABHOLORT").expect("valid regex")));

static ITEM_MARKER: LazyLock<Marker> = LazyLock::new(|| {
    Marker::new("span", Regex::new(r"\bARTIKEL\b").expect("valid regex")).with_class("rio_15_grey")
});

/// Structured content of one pickup notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedNotification {
    /// Carrier tracking id, if the text carries one.
    pub tracking_number: Option<String>,
    /// `"{location}, {street}"`, or the strategy's failure value.
    pub pickup_location: String,
    /// Pickup deadline as `DD.MM.YYYY`.
    pub due_date: Option<String>,
    /// Item name with HTML entities kept, or [`UNKNOWN_ITEM`].
    pub preview: String,
}

impl ParsedNotification {
    /// Renders the body of the pickup reminder.
    ///
    /// ```text
    /// {preview}
    /// Abholort: {pickup_location}
    /// Abholen bis: {due_date}
    /// Tracking: {tracking_number}
    /// ```
    ///
    /// Absent optional fields are written as `unbekannt`.
    #[must_use]
    pub fn task_notes(&self) -> String {
        format!(
            "{}\nAbholort: {}\nAbholen bis: {}\nTracking: {}",
            self.preview,
            self.pickup_location,
            self.due_date.as_deref().unwrap_or(UNKNOWN_FIELD),
            self.tracking_number.as_deref().unwrap_or(UNKNOWN_FIELD),
        )
    }
}

/// How the pickup location is located in a notification.
///
/// Pick one up front; the extractor never falls back from one to the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocationStrategy {
    /// Walk the table rows following the `ABHOLORT` label.
    ///
    /// The location name sits two rows below the label row and the street one row
    /// further. Fails with [`ADDRESS_NOT_FOUND`].
    #[default]
    Structural,
    /// Classify the text lines between an `ABHOLORT` label directly followed by a `DHL`
    /// line and `Öffnungszeiten`.
    ///
    /// The line containing `Packstation` is the location and the first other line
    /// with a digit is the street. Fails with an empty string.
    TextPattern,
}

/// Extracts [`ParsedNotification`]s from notification HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickupExtractor {
    location_strategy: LocationStrategy,
}

impl PickupExtractor {
    /// Creates an extractor using the structural location strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with the given location strategy.
    #[must_use]
    pub fn with_location_strategy(location_strategy: LocationStrategy) -> Self {
        Self { location_strategy }
    }

    /// Returns the configured location strategy.
    #[must_use]
    pub fn location_strategy(&self) -> LocationStrategy {
        self.location_strategy
    }

    /// Extracts all fields, resolving the due date against the current UTC time.
    #[must_use]
    pub fn extract(&self, html: &str) -> ParsedNotification {
        self.extract_at(html, Utc::now())
    }

    /// Extracts all fields, resolving the due date against `reference_now`.
    #[must_use]
    #[instrument(
        name = "PickupExtractor::extract",
        skip_all,
        fields(html_len = html.len(), strategy = ?self.location_strategy)
    )]
    pub fn extract_at(&self, html: &str, reference_now: impl CalendarDate) -> ParsedNotification {
        let document = HtmlDocument::parse(html);
        self.extract_from(&document, reference_now)
    }

    /// Extracts all fields from an already parsed document.
    #[must_use]
    pub fn extract_from<D: DocumentTree>(
        &self,
        document: &D,
        reference_now: impl CalendarDate,
    ) -> ParsedNotification {
        let text = document.flattened_text();

        let pickup_location = match self.location_strategy {
            LocationStrategy::Structural => {
                structural_location(document).unwrap_or_else(|| ADDRESS_NOT_FOUND.to_owned())
            }
            LocationStrategy::TextPattern => text_pattern_location(&text).unwrap_or_default(),
        };

        let parsed = ParsedNotification {
            tracking_number: tracking_number(&text),
            pickup_location,
            due_date: due_date(&text, reference_now),
            preview: item_preview(document).unwrap_or_else(|| UNKNOWN_ITEM.to_owned()),
        };

        debug!(
            tracking_found = parsed.tracking_number.is_some(),
            due_date_found = parsed.due_date.is_some(),
            "Extracted pickup notification"
        );

        parsed
    }
}

/// Extracts a notification with the structural strategy and the current UTC time.
#[must_use]
pub fn extract(html: &str) -> ParsedNotification {
    PickupExtractor::new().extract(html)
}

fn tracking_number(text: &str) -> Option<String> {
    let found = TRACKING_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned());
    traced(found, "tracking_number", "pattern")
}

fn due_date(text: &str, reference_now: impl CalendarDate) -> Option<String> {
    let caps = traced(DUE_DATE.captures(text), "due_date", "pattern")?;
    let day: u32 = traced(caps[2].parse().ok(), "due_date", "day")?;

    match resolve_german_date(day, &caps[3], reference_now) {
        Ok(date) => Some(format_due_date(date)),
        Err(e) => {
            debug!(field = "due_date", error = %e, "Due date not resolvable");
            None
        }
    }
}

fn structural_location<D: DocumentTree>(document: &D) -> Option<String> {
    const FIELD: &str = "pickup_location";

    let label = traced(document.find_by_marker_text(&LOCATION_MARKER), FIELD, "marker")?;
    let header = traced(document.enclosing(label, "tr"), FIELD, "header row")?;
    let carrier = traced(document.following_sibling(header, "tr"), FIELD, "carrier row")?;
    let location = traced(document.following_sibling(carrier, "tr"), FIELD, "location row")?;
    let street = traced(document.following_sibling(location, "tr"), FIELD, "street row")?;

    Some(format!(
        "{}, {}",
        document.inner_text(location),
        document.inner_text(street)
    ))
}

fn text_pattern_location(text: &str) -> Option<String> {
    const FIELD: &str = "pickup_location";

    let caps = traced(LOCATION_BLOCK.captures(text), FIELD, "pattern")?;
    let lines: Vec<&str> = caps[1]
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let station = lines.iter().find(|line| line.contains("Packstation"));
    let street = lines
        .iter()
        .find(|line| !line.contains("Packstation") && line.chars().any(|c| c.is_ascii_digit()));

    let station = traced(station, FIELD, "station line")?;
    let street = traced(street, FIELD, "street line")?;
    Some(format!("{station}, {street}"))
}

fn item_preview<D: DocumentTree>(document: &D) -> Option<String> {
    const FIELD: &str = "preview";

    let label = traced(document.find_by_marker_text(&ITEM_MARKER), FIELD, "marker")?;
    let header = traced(document.enclosing(label, "tr"), FIELD, "header row")?;
    let item_row = traced(document.following_sibling(header, "tr"), FIELD, "item row")?;

    let html = match document.styled_descendant(item_row, "span", ITEM_NAME_CLASS) {
        Some(name) => document.inner_html_preserving_entities(name),
        None => {
            debug!(field = FIELD, "Item name span missing, using whole row");
            document.inner_html_preserving_entities(item_row)
        }
    };
    Some(html)
}

/// Logs a structural miss at debug level and passes the value through.
fn traced<T>(value: Option<T>, field: &'static str, step: &'static str) -> Option<T> {
    if value.is_none() {
        debug!(field, step, "Lookup step found nothing");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    const LOCATION_ROWS: &str = r#"
        <table>
          <tr><td><span class="rio_15_grey">ABHOLORT</span></td></tr>
          <tr><td><span>DHL</span></td></tr>
          <tr><td><span>Packstation 158</span></td></tr>
          <tr><td><span>Südhöhe 38</span></td></tr>
          <tr><td><span>01069 Dresden</span></td></tr>
          <tr><td><span>Öffnungszeiten</span></td></tr>
        </table>"#;

    #[test]
    fn test_tracking_number() {
        assert_eq!(
            tracking_number("Ihre Tracking-Nummer lautet:\n  JJD000390016890406943\n").as_deref(),
            Some("JJD000390016890406943")
        );
        assert_eq!(tracking_number("Tracking-Nummer lautet: jjd123"), None);
        assert_eq!(tracking_number("Sendungsnummer: JJD123"), None);
    }

    #[test]
    fn test_due_date_across_lines() {
        let text = "ABHOLUNG BIS ZUM\n      \n   Freitag, 10. Januar\n";
        assert_eq!(due_date(text, dec_first()).as_deref(), Some("10.01.2026"));
    }

    #[test]
    fn test_due_date_umlaut_month() {
        let text = "ABHOLUNG BIS ZUM\nDienstag, 3. März";
        assert_eq!(due_date(text, dec_first()).as_deref(), Some("03.03.2026"));
    }

    #[test]
    fn test_due_date_failures_become_none() {
        assert_eq!(due_date("ABHOLUNG BIS ZUM\nFreitag, 10. Smarch", dec_first()), None);
        assert_eq!(due_date("ABHOLUNG BIS ZUM\nMontag, 31. Februar", dec_first()), None);
        assert_eq!(due_date("ABHOLUNG BIS ZUM\nFreitag 10 Januar", dec_first()), None);
        assert_eq!(due_date("", dec_first()), None);
    }

    #[test]
    fn test_structural_location() {
        let parsed = PickupExtractor::new().extract_at(LOCATION_ROWS, dec_first());
        assert_eq!(parsed.pickup_location, "Packstation 158, Südhöhe 38");
    }

    #[test]
    fn test_structural_location_missing_row() {
        let html = r#"<table>
            <tr><td><span>ABHOLORT</span></td></tr>
            <tr><td>DHL</td></tr>
            <tr><td>Packstation 158</td></tr>
        </table>"#;
        let parsed = PickupExtractor::new().extract_at(html, dec_first());
        assert_eq!(parsed.pickup_location, ADDRESS_NOT_FOUND);
    }

    #[test]
    fn test_text_pattern_location() {
        let extractor = PickupExtractor::with_location_strategy(LocationStrategy::TextPattern);
        let parsed = extractor.extract_at(LOCATION_ROWS, dec_first());
        assert_eq!(parsed.pickup_location, "Packstation 158, Südhöhe 38");
    }

    #[test]
    fn test_text_pattern_location_without_closing_marker() {
        let html = LOCATION_ROWS.replace("Öffnungszeiten", "Hinweise");
        let extractor = PickupExtractor::with_location_strategy(LocationStrategy::TextPattern);
        assert_eq!(extractor.extract_at(&html, dec_first()).pickup_location, "");
    }

    #[test]
    fn test_text_pattern_location_without_carrier_line() {
        let html = LOCATION_ROWS.replace("<tr><td><span>DHL</span></td></tr>", "");
        let extractor = PickupExtractor::with_location_strategy(LocationStrategy::TextPattern);
        assert_eq!(extractor.extract_at(&html, dec_first()).pickup_location, "");
    }

    #[test]
    fn test_text_pattern_location_carrier_must_follow_label() {
        let html = LOCATION_ROWS.replace(">DHL<", ">Hermes<");
        let extractor = PickupExtractor::with_location_strategy(LocationStrategy::TextPattern);
        assert_eq!(extractor.extract_at(&html, dec_first()).pickup_location, "");
    }

    #[test]
    fn test_text_pattern_location_without_station_line() {
        let html = LOCATION_ROWS.replace("Packstation 158", "Postfiliale 502");
        let extractor = PickupExtractor::with_location_strategy(LocationStrategy::TextPattern);
        assert_eq!(extractor.extract_at(&html, dec_first()).pickup_location, "");
    }

    #[test]
    fn test_preview_falls_back_to_row_markup() {
        let html = r#"<table>
            <tr><td><span class="rio_15_grey">ARTIKEL</span></td></tr>
            <tr><td><b>Kaffeebohnen</b></td></tr>
        </table>"#;
        let parsed = PickupExtractor::new().extract_at(html, dec_first());
        assert_eq!(parsed.preview, "<td><b>Kaffeebohnen</b></td>");
    }

    #[test]
    fn test_preview_marker_needs_class_and_whole_word() {
        let wrong_class = r#"<table>
            <tr><td><span class="rio_15_black">ARTIKEL</span></td></tr>
            <tr><td><span class="rio_15_heavy_black">Tasse</span></td></tr>
        </table>"#;
        let partial_word =
            wrong_class.replace("rio_15_black\">ARTIKEL", "rio_15_grey\">ARTIKELNUMMER");

        for html in [wrong_class.to_owned(), partial_word] {
            let parsed = PickupExtractor::new().extract_at(&html, dec_first());
            assert_eq!(parsed.preview, UNKNOWN_ITEM);
        }
    }

    #[test]
    fn test_empty_input_yields_all_fallbacks() {
        let parsed = extract("");
        assert_eq!(
            parsed,
            ParsedNotification {
                tracking_number: None,
                pickup_location: ADDRESS_NOT_FOUND.to_owned(),
                due_date: None,
                preview: UNKNOWN_ITEM.to_owned(),
            }
        );
    }

    #[test]
    fn test_task_notes() {
        let parsed = ParsedNotification {
            tracking_number: Some("JJD1".into()),
            pickup_location: "Packstation 158, Südhöhe 38".into(),
            due_date: None,
            preview: "Reorda&reg; Metallband...".into(),
        };
        assert_eq!(
            parsed.task_notes(),
            "Reorda&reg; Metallband...\n\
             Abholort: Packstation 158, Südhöhe 38\n\
             Abholen bis: unbekannt\n\
             Tracking: JJD1"
        );
    }
}
