//! Blocking `HttpTransport` backed by `ureq`.
//!
//! The agent is configured so 4xx/5xx responses come back as data. The
//! client decides what a response means from its body alone, so status codes
//! must never short-circuit into the error channel here. Bodies are read as
//! raw bytes with no size cap; decoding is the client's job.

use std::fmt;

use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a caller-configured agent (timeouts, proxies, TLS).
    ///
    /// The agent should have `http_status_as_error(false)`, otherwise error
    /// payloads sent with a non-2xx status surface as transport failures.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }

    fn run_custom(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: Option<String>,
    ) -> Result<ureq::http::Response<ureq::Body>, TransportError> {
        let mut builder = ureq::http::Request::builder().method(method).uri(url);
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder.body(body.unwrap_or_default()).map_err(TransportError::new)?;
        self.agent.run(request).map_err(TransportError::new)
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl HttpTransport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let response = match method {
            HttpMethod::Get => send_without_body(self.agent.get(url.as_str()), &headers, body),
            HttpMethod::Delete => send_without_body(self.agent.delete(url.as_str()), &headers, body),
            HttpMethod::Post => send_with_body(self.agent.post(url.as_str()), &headers, body),
            HttpMethod::Put => send_with_body(self.agent.put(url.as_str()), &headers, body),
            HttpMethod::Custom(name) => self.run_custom(&name, &url, &headers, body),
        }?;

        into_response(response)
    }
}

fn into_response(
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<HttpResponse, TransportError> {
    let status = response.status().as_u16();
    let headers = collect_headers(response.headers());
    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(TransportError::new)?;
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn collect_headers(headers: &ureq::http::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// GET and DELETE carry a body only when the caller supplied one.
fn send_without_body(
    builder: RequestBuilder<WithoutBody>,
    headers: &[(String, String)],
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, TransportError> {
    let builder = with_headers(builder, headers);
    match body {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
    .map_err(TransportError::new)
}

fn send_with_body(
    builder: RequestBuilder<WithBody>,
    headers: &[(String, String)],
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, TransportError> {
    let builder = with_headers(builder, headers);
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
    .map_err(TransportError::new)
}
