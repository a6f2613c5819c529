//! Request extractors whose rejections use the API error envelope.

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor. Malformed or mistyped bodies are rejected with a
/// 400 `{status: "error", message, code}` envelope instead of axum's
/// plain-text 422.
///
/// ```ignore
/// async fn create(AppJson(input): AppJson<CreatePost>) -> AppResult<Json<()>> { .. }
/// ```
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
