//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `Client` builds an `HttpRequest`,
//! hands it to an `HttpTransport`, and decodes the `HttpResponse` it gets
//! back. Swapping the transport is how tests observe the wire without a
//! network, and how callers bring their own HTTP stack.
//!
//! All fields use owned types (`String`, `Vec`) so values can be recorded and
//! replayed without lifetime concerns.

use std::fmt;
use std::sync::Arc;

use crate::error::TransportError;

/// HTTP method for a request.
///
/// The four verbs the client wraps get their own variant. Any other name is
/// carried through as `Custom` without validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Custom(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Custom(name) => name,
        }
    }
}

impl From<&str> for HttpMethod {
    fn from(name: &str) -> Self {
        match name {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            other => HttpMethod::Custom(other.to_string()),
        }
    }
}

impl From<String> for HttpMethod {
    fn from(name: String) -> Self {
        match HttpMethod::from(name.as_str()) {
            HttpMethod::Custom(_) => HttpMethod::Custom(name),
            known => known,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `Client::build_request`. `url` is the full target, base URL and
/// path already joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value whose name matches `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// The status is recorded but never interpreted by the client; only `body`
/// drives the outcome of a call. The body is kept as raw bytes so invalid
/// UTF-8 surfaces as a decode failure, not a transport one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A 200 response carrying `body` and no headers.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Executes one HTTP round-trip.
///
/// Implementations must return non-2xx responses as data. Only failures to
/// obtain a response at all (DNS, refused connection, malformed URL, broken
/// body stream) belong in the error channel.
pub trait HttpTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}
