//! Response handling and transformation.
//!
//! # Responsibilities
//! - Collect what the redirector writes (status, headers, body)
//! - Convert the collected response into an Axum response
//!
//! # Design Decisions
//! - Buffered, not streamed: interstitial screens are small and rendered
//!   in one piece
//! - A bare redirect is recorded separately from an explicit status plus
//!   `Location`, so callers can tell them apart
//! - No status written yet means 200 OK

use std::io;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::redirect::redirector::FOUND;
use crate::redirect::sink::ResponseSink;

/// An in-memory response the redirector writes into.
#[derive(Debug, Default, Clone)]
pub struct BufferedResponse {
    status: Option<u16>,
    headers: HeaderMap,
    body: String,
    bare_redirect: bool,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status set so far, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// True when the redirect was issued through `send_redirect`.
    pub fn is_bare_redirect(&self) -> bool {
        self.bare_redirect
    }
}

impl ResponseSink for BufferedResponse {
    fn send_redirect(&mut self, location: &str) -> io::Result<()> {
        self.set_header(header::LOCATION.as_str(), location)?;
        self.status = Some(FOUND);
        self.bare_redirect = true;
        Ok(())
    }

    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn set_header(&mut self, name: &str, value: &str) -> io::Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let value = HeaderValue::from_str(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.headers.insert(name, value);
        Ok(())
    }

    fn write_body(&mut self, body: String) -> io::Result<()> {
        self.body.push_str(&body);
        Ok(())
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let status = match self.status {
            None => StatusCode::OK,
            Some(code) => StatusCode::from_u16(code).unwrap_or_else(|_| {
                tracing::warn!(status = code, "Invalid HTTP status, answering 500");
                StatusCode::INTERNAL_SERVER_ERROR
            }),
        };

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_redirect() {
        let mut response = BufferedResponse::new();
        response.send_redirect("/hello").unwrap();

        assert!(response.is_bare_redirect());
        assert_eq!(response.status(), Some(302));
        assert_eq!(response.header("Location"), Some("/hello"));

        let response = response.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/hello");
    }

    #[test]
    fn test_explicit_status_and_location() {
        let mut response = BufferedResponse::new();
        response.set_status(307);
        response.set_header("location", "/bye").unwrap();

        assert!(!response.is_bare_redirect());
        let response = response.into_response();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[test]
    fn test_invalid_header_value() {
        let mut response = BufferedResponse::new();
        let err = response.set_header("location", "/a\nb").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_body_defaults_to_ok() {
        let mut response = BufferedResponse::new();
        response.set_content_type("text/html; charset=utf-8").unwrap();
        response.write_body("<p>hi</p>".to_string()).unwrap();

        assert_eq!(response.body(), "<p>hi</p>");
        assert_eq!(response.into_response().status(), StatusCode::OK);
    }
}
