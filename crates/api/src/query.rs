//! Shared query parameter types for API handlers.

use escutas_core::history::{PageRequest, ReviewFilters};
use serde::Deserialize;

/// Page-based pagination parameters (`?page=&per_page=`).
///
/// Values are normalized by [`PageRequest::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PaginationParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

/// Review history filters plus pagination.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub album_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl HistoryParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }

    pub fn filters(&self) -> ReviewFilters {
        ReviewFilters::parse(
            self.album_id.as_deref(),
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )
    }
}

/// `?month=&year=`; both default to the current UTC month.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarParams {
    pub month: Option<i64>,
    pub year: Option<i64>,
}

/// Free-text search (`?q=`).
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    /// The trimmed query, or `None` when absent or blank.
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}
