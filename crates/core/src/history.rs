//! Review history helpers: pagination math, date filters and calendar
//! bucketing.
//!
//! All calendar arithmetic is done on UTC days.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Page used when the client does not ask for one.
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when the client does not ask for one.
pub const DEFAULT_PER_PAGE: i64 = 10;
/// Largest page size a client may request.
pub const MAX_PER_PAGE: i64 = 100;

/// A normalized page request. Never fails: nonsense values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub per_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        let total_items = total_items.max(0);
        let total_pages = (total_items + request.per_page - 1) / request.per_page;
        Self {
            page: request.page,
            per_page: request.per_page,
            total_items,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Date format accepted by the history filters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn start_of_day(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// AND-combined filters over a user's review history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilters {
    pub album_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReviewFilters {
    /// Build filters from raw query values.
    ///
    /// Malformed dates are dropped rather than rejected; the request then
    /// behaves as if that bound was never sent.
    pub fn parse(album_id: Option<&str>, start_date: Option<&str>, end_date: Option<&str>) -> Self {
        let lenient = |name: &str, raw: Option<&str>| {
            let raw = raw.filter(|s| !s.trim().is_empty())?;
            let parsed = parse_date(raw);
            if parsed.is_none() {
                tracing::debug!(filter = name, value = raw, "Ignoring malformed date filter");
            }
            parsed
        };

        Self {
            album_id: album_id
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            start_date: lenient("start_date", start_date),
            end_date: lenient("end_date", end_date),
        }
    }

    /// Inclusive lower bound on `created_at`.
    pub fn created_from(&self) -> Option<Timestamp> {
        self.start_date.map(start_of_day)
    }

    /// Exclusive upper bound on `created_at` (the day after `end_date`).
    pub fn created_before(&self) -> Option<Timestamp> {
        self.end_date
            .and_then(|d| d.succ_opt())
            .map(start_of_day)
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// A validated calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    month: u32,
    year: i32,
}

impl CalendarMonth {
    /// Validate a month (1-12) and year (1-9999).
    pub fn new(month: i64, year: i64) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::Validation(format!(
                "Invalid month {month}. Must be between 1 and 12"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(CoreError::Validation(format!(
                "Invalid year {year}. Must be between 1 and 9999"
            )));
        }
        Ok(Self {
            month: month as u32,
            year: year as i32,
        })
    }

    /// The month containing `now`.
    pub fn current(now: Timestamp) -> Self {
        Self {
            month: now.month(),
            year: now.year(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// `[start, end)` of the month as UTC instants.
    pub fn bounds(&self) -> (Timestamp, Timestamp) {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        // Both dates are valid for any month/year accepted by `new`.
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default();
        let next = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap_or(NaiveDate::MAX);
        (start_of_day(first), start_of_day(next))
    }
}

/// Bucket items by UTC day-of-month.
///
/// Keys are the unpadded day number (`"7"`, `"21"`). Each bucket is ordered
/// most recent first, so index 0 is the last item of that day.
pub fn group_by_day<T, F>(items: Vec<T>, created_at: F) -> BTreeMap<String, Vec<T>>
where
    F: Fn(&T) -> Timestamp,
{
    let mut days: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for item in items {
        days.entry(created_at(&item).day().to_string())
            .or_default()
            .push(item);
    }
    for bucket in days.values_mut() {
        bucket.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    }
    days
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    // -- pagination --

    #[test]
    fn page_request_defaults_and_clamps() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, per_page: 10 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, per_page: 1 });
        assert_eq!(PageRequest::new(Some(-3), Some(1000)).per_page, MAX_PER_PAGE);
        assert_eq!(PageRequest::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn page_meta_middle_page() {
        let meta = PageMeta::new(PageRequest::new(Some(2), Some(10)), 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn page_meta_beyond_last_page_has_no_next() {
        let meta = PageMeta::new(PageRequest::new(Some(9), Some(10)), 25);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn page_meta_empty_history() {
        let meta = PageMeta::new(PageRequest::default(), 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    // -- filters --

    #[test]
    fn filters_parse_valid_dates_to_inclusive_bounds() {
        let filters = ReviewFilters::parse(Some("ext1"), Some("2024-03-01"), Some("2024-03-31"));
        assert_eq!(filters.album_id.as_deref(), Some("ext1"));
        assert_eq!(filters.created_from(), Some(at(2024, 3, 1, 0)));
        assert_eq!(filters.created_before(), Some(at(2024, 4, 1, 0)));
    }

    #[test]
    fn malformed_dates_are_ignored() {
        let filters = ReviewFilters::parse(None, Some("yesterday"), Some("2024-13-45"));
        assert_eq!(filters, ReviewFilters::default());
    }

    #[test]
    fn blank_values_are_treated_as_absent() {
        let filters = ReviewFilters::parse(Some(" "), Some(""), None);
        assert!(filters.album_id.is_none());
        assert!(filters.created_from().is_none());
        assert!(filters.created_before().is_none());
    }

    // -- calendar --

    #[test]
    fn calendar_month_validates_range() {
        assert!(CalendarMonth::new(1, 2024).is_ok());
        assert!(CalendarMonth::new(12, 2024).is_ok());
        assert_matches!(CalendarMonth::new(0, 2024), Err(CoreError::Validation(_)));
        assert_matches!(CalendarMonth::new(13, 2024), Err(CoreError::Validation(_)));
        assert_matches!(CalendarMonth::new(5, 0), Err(CoreError::Validation(_)));
    }

    #[test]
    fn calendar_bounds_cover_exactly_one_month() {
        let (start, end) = CalendarMonth::new(2, 2024).unwrap().bounds();
        assert_eq!(start, at(2024, 2, 1, 0));
        assert_eq!(end, at(2024, 3, 1, 0));

        let (start, end) = CalendarMonth::new(12, 2023).unwrap().bounds();
        assert_eq!(start, at(2023, 12, 1, 0));
        assert_eq!(end, at(2024, 1, 1, 0));
    }

    #[test]
    fn group_by_day_orders_each_day_most_recent_first() {
        let items = vec![
            ("morning", at(2024, 5, 7, 9)),
            ("other day", at(2024, 5, 21, 12)),
            ("evening", at(2024, 5, 7, 21)),
        ];
        let days = group_by_day(items, |(_, ts)| *ts);

        assert_eq!(days.len(), 2);
        let seventh: Vec<&str> = days["7"].iter().map(|(name, _)| *name).collect();
        assert_eq!(seventh, vec!["evening", "morning"]);
        assert_eq!(days["21"].len(), 1);
    }
}
