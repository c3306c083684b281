//! German calendar text normalization.
//!
//! Pickup notifications print deadlines as `Freitag, 10. Januar` without a year. The
//! year is inferred from a reference moment: the deadline is the next occurrence of that
//! day and month, never more than one year out.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use inbox_watch::locale::{format_due_date, resolve_german_date};
//!
//! let now = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
//! let due = resolve_german_date(10, "Januar", now).unwrap();
//! assert_eq!(format_due_date(due), "10.01.2026");
//! ```

use crate::error::{Error, Result};
use crate::freshness::CalendarDate;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::sync::LazyLock;

/// German month names and their ordinals.
static GERMAN_MONTHS: LazyLock<HashMap<&'static str, u32>> = LazyLock::new(|| {
    HashMap::from([
        ("Januar", 1),
        ("Februar", 2),
        ("März", 3),
        ("April", 4),
        ("Mai", 5),
        ("Juni", 6),
        ("Juli", 7),
        ("August", 8),
        ("September", 9),
        ("Oktober", 10),
        ("November", 11),
        ("Dezember", 12),
    ])
});

/// Looks up the ordinal (1-12) of a German month name.
///
/// Surrounding whitespace is ignored; the name itself must match exactly.
#[must_use]
pub fn german_month(name: &str) -> Option<u32> {
    GERMAN_MONTHS.get(name.trim()).copied()
}

/// Resolves `day`. `month_name` to an absolute date relative to `reference_now`.
///
/// The candidate is built in the reference year. If it lies strictly before the
/// reference date it is moved to the following year.
///
/// # Errors
///
/// - [`Error::UnknownMonth`] if `month_name` is not a German month name.
/// - [`Error::InvalidDate`] if `day` does not exist in the resolved month and year.
pub fn resolve_german_date(
    day: u32,
    month_name: &str,
    reference_now: impl CalendarDate,
) -> Result<NaiveDate> {
    let month = german_month(month_name).ok_or_else(|| Error::UnknownMonth {
        month: month_name.to_string(),
    })?;

    let today = reference_now.calendar_date();
    let candidate = date_or_error(today.year(), month, day)?;

    if candidate < today {
        date_or_error(today.year() + 1, month, day)
    } else {
        Ok(candidate)
    }
}

/// Renders a date as `DD.MM.YYYY`.
#[must_use]
pub fn format_due_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

fn date_or_error(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::InvalidDate { day, month, year })
}
