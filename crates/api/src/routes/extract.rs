//! Extractors whose rejections render as `AppError`.
//!
//! axum's own `Json` and `Path` reject with plain-text 4xx bodies. These
//! wrappers route the same failures through `AppError` so a malformed body or
//! path segment is a 400 with the usual `{"error": ...}` payload.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Typed path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);
