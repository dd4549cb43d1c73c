//! Request extractors
//!
//! `AppJson` behaves like `axum::Json` but rejects bad bodies through
//! `ApiError`, so clients always get a `{"message": "..."}` body.

use crate::error::ApiError;
use axum::extract::FromRequest;

/// JSON body extractor whose rejection is an `ApiError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
