//! Shared response envelope types for API handlers.
//!
//! Successful responses use `{ "status": "success", "message", "data" }`;
//! paginated listings add a `meta` object. Errors are rendered by
//! [`AppError`](crate::error::AppError).

use escutas_core::history::PageMeta;
use serde::Serialize;

/// Standard success envelope.
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_message("Success", data)
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data,
        }
    }
}

/// Success envelope for a page of results.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, meta: PageMeta) -> Self {
        Self {
            status: "success",
            message: "Success".to_string(),
            data,
            meta,
        }
    }
}
