//! Request handling and transformation.
//!
//! # Responsibilities
//! - Read the request ID set by the request-id middleware
//! - Build the request context handed to mappers
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The context is a copy; mappers never see the live request

use axum::http::{HeaderMap, HeaderName, Uri};

use crate::mapping::matching::RequestContext;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID of a request, if the middleware set one.
pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(&X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

/// Snapshot of the request for mappers.
pub fn request_context(uri: &Uri, headers: &HeaderMap) -> RequestContext {
    RequestContext {
        headers: headers.clone(),
        query: uri.query().map(str::to_string),
        request_id: request_id(headers).map(str::to_string),
    }
}
