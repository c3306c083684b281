//! The sliding freshness window shared by every handler.
//!
//! A record is acted on only if its calendar date is no older than yesterday. The
//! window has no upper bound: dates in the future count as fresh, so clock skew
//! between the source and this process never drops an event.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use inbox_watch::freshness::is_recent_at;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
//!
//! assert!(is_recent_at(NaiveDate::from_ymd_opt(2025, 11, 30).unwrap(), today));
//! assert!(!is_recent_at(NaiveDate::from_ymd_opt(2025, 11, 29).unwrap(), today));
//! ```

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// A value that has a calendar date.
///
/// Timestamps contribute only their date component. Zoned timestamps use the date in
/// their own offset, i.e. the date that is printed on the record.
pub trait CalendarDate {
    /// Returns the calendar date of this value.
    fn calendar_date(&self) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn calendar_date(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDate for NaiveDateTime {
    fn calendar_date(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDate for DateTime<Tz> {
    fn calendar_date(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl<T: CalendarDate + ?Sized> CalendarDate for &T {
    fn calendar_date(&self) -> NaiveDate {
        (**self).calendar_date()
    }
}

/// Lookback window measured in whole calendar days.
///
/// The default window looks back one day: today and yesterday are fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessWindow {
    lookback_days: u32,
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self { lookback_days: 1 }
    }
}

impl FreshnessWindow {
    /// Creates a window that accepts dates up to `lookback_days` before today.
    #[must_use]
    pub fn new(lookback_days: u32) -> Self {
        Self { lookback_days }
    }

    /// Returns the number of days this window looks back.
    #[must_use]
    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// Returns the oldest date still considered fresh relative to `today`.
    ///
    /// `None` if the boundary falls before the earliest representable date, in which
    /// case every date is fresh.
    #[must_use]
    pub fn oldest_fresh_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_sub_days(Days::new(u64::from(self.lookback_days)))
    }

    /// Checks `candidate` against an explicit `today`.
    #[must_use]
    pub fn is_fresh_at(&self, candidate: impl CalendarDate, today: NaiveDate) -> bool {
        self.oldest_fresh_date(today)
            .map_or(true, |oldest| candidate.calendar_date() >= oldest)
    }

    /// Checks `candidate` against today's UTC date, read at call time.
    #[must_use]
    pub fn is_fresh(&self, candidate: impl CalendarDate) -> bool {
        self.is_fresh_at(candidate, Utc::now().date_naive())
    }

    /// Keeps the items whose date, as returned by `date_of`, is fresh relative to `today`.
    ///
    /// Order is preserved.
    pub fn retain_fresh<T, D, F>(
        &self,
        items: impl IntoIterator<Item = T>,
        today: NaiveDate,
        date_of: F,
    ) -> Vec<T>
    where
        D: CalendarDate,
        F: Fn(&T) -> D,
    {
        items
            .into_iter()
            .filter(|item| self.is_fresh_at(date_of(item), today))
            .collect()
    }
}

/// Returns `true` if `candidate` is today or yesterday (or later), using today's UTC date.
#[must_use]
pub fn is_recent(candidate: impl CalendarDate) -> bool {
    FreshnessWindow::default().is_fresh(candidate)
}

/// Returns `true` if `candidate` is no older than the day before `today`.
#[must_use]
pub fn is_recent_at(candidate: impl CalendarDate, today: NaiveDate) -> bool {
    FreshnessWindow::default().is_fresh_at(candidate, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, NaiveTime};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_today_and_yesterday_are_recent() {
        let today = ymd(2025, 12, 1);
        assert!(is_recent_at(today, today));
        assert!(is_recent_at(ymd(2025, 11, 30), today));
    }

    #[test]
    fn test_two_days_ago_is_stale() {
        let today = ymd(2025, 12, 1);
        assert!(!is_recent_at(ymd(2025, 11, 29), today));
        assert!(!is_recent_at(ymd(2024, 12, 1), today));
    }

    #[test]
    fn test_future_dates_are_recent_by_policy() {
        // No upper bound: tolerates clock skew and early triggers.
        let today = ymd(2025, 12, 1);
        assert!(is_recent_at(ymd(2025, 12, 2), today));
        assert!(is_recent_at(ymd(2030, 1, 1), today));
    }

    #[test]
    fn test_time_of_day_is_ignored() {
        let today = ymd(2025, 12, 1);
        let yesterday_night =
            ymd(2025, 11, 30).and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap());
        let yesterday_morning = ymd(2025, 11, 30).and_time(NaiveTime::MIN);
        let two_days_noon = ymd(2025, 11, 29).and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap());

        assert!(is_recent_at(yesterday_night, today));
        assert!(is_recent_at(yesterday_morning, today));
        assert!(!is_recent_at(two_days_noon, today));
    }

    #[test]
    fn test_zoned_timestamp_uses_its_own_date() {
        let today = ymd(2025, 12, 1);
        let berlin = FixedOffset::east_opt(3600).unwrap();
        // 23:30 UTC on Nov 29 is already Nov 30 in Berlin.
        let late = Utc
            .with_ymd_and_hms(2025, 11, 29, 23, 30, 0)
            .unwrap()
            .with_timezone(&berlin);

        assert!(is_recent_at(late, today));
        assert!(!is_recent_at(late.with_timezone(&Utc), today));
    }

    #[test]
    fn test_wider_window() {
        let window = FreshnessWindow::new(7);
        let today = ymd(2025, 12, 1);
        assert!(window.is_fresh_at(ymd(2025, 11, 24), today));
        assert!(!window.is_fresh_at(ymd(2025, 11, 23), today));
        assert_eq!(window.lookback_days(), 7);
    }

    #[test]
    fn test_boundary_underflow_accepts_everything() {
        let window = FreshnessWindow::new(u32::MAX);
        assert!(window.is_fresh_at(NaiveDate::MIN, ymd(2025, 12, 1)));
    }

    #[test]
    fn test_retain_fresh_keeps_order() {
        let today = ymd(2025, 12, 1);
        let chapters = vec![
            ("ch. 120", ymd(2025, 12, 1)),
            ("ch. 119", ymd(2025, 11, 20)),
            ("ch. 121", ymd(2025, 11, 30)),
        ];

        let fresh = FreshnessWindow::default().retain_fresh(chapters, today, |c| c.1);
        let names: Vec<_> = fresh.iter().map(|c| c.0).collect();
        assert_eq!(names, vec!["ch. 120", "ch. 121"]);
    }

    #[test]
    fn test_is_recent_uses_wall_clock() {
        let now = Utc::now();
        assert!(is_recent(now));
        assert!(is_recent(now - Duration::days(1)));
        assert!(!is_recent(now - Duration::days(3)));
    }
}
