//! Connection-string handling: base URL and Basic-auth credentials.
//!
//! # Design
//! The connection string is parsed once. Credentials move out of the URL and
//! into a precomputed `Authorization` value, and the remaining parts are
//! joined back into `scheme://host[:port][path]`. `url` validates the string
//! and normalizes the host; userinfo, port and path are taken from the raw
//! text so they survive exactly as written. That string is then used
//! as a plain prefix; request paths are concatenated onto it with no
//! further normalization.

use base64::prelude::*;
use url::Url;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub base_url: String,
    pub authorization: Option<String>,
}

impl Endpoint {
    pub fn parse(server: &str) -> Result<Self, ClientError> {
        let (scheme, rest) = server.split_once("://").unwrap_or(("http", server));
        let rest = rest.trim_end_matches('/');
        // Validates the whole string and normalizes the host.
        let url = Url::parse(&format!("{scheme}://{rest}"))?;

        let raw = RawParts::split(rest);
        let authorization = raw.userinfo.and_then(|userinfo| {
            let (username, password) = userinfo.split_once(':').unwrap_or((userinfo, ""));
            if username.is_empty() && password.is_empty() {
                None
            } else {
                Some(basic_auth(username, password))
            }
        });

        let mut base_url = format!("{}://{}", url.scheme(), url.host_str().unwrap_or(""));
        if let Some(port) = raw.port {
            base_url.push_str(&format!(":{port}"));
        }
        if raw.path != "/" {
            base_url.push_str(raw.path);
        }

        Ok(Self {
            base_url,
            authorization,
        })
    }
}

/// Pieces of the connection string kept exactly as written.
struct RawParts<'a> {
    userinfo: Option<&'a str>,
    port: Option<u16>,
    path: &'a str,
}

impl<'a> RawParts<'a> {
    /// Split everything after `scheme://`.
    fn split(rest: &'a str) -> Self {
        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);
        let path = &tail[..tail.find(['?', '#']).unwrap_or(tail.len())];

        let (userinfo, host_port) = match authority.rsplit_once('@') {
            Some((userinfo, host_port)) => (Some(userinfo), host_port),
            None => (None, authority),
        };

        // Skip past an IPv6 literal before looking for the port separator.
        let host_end = host_port.rfind(']').unwrap_or(0);
        let port = host_port[host_end..]
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse().ok());

        Self {
            userinfo,
            port,
            path,
        }
    }
}

/// `Authorization` header value for the Basic scheme (RFC 7617).
pub(crate) fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64_STANDARD.encode(format!("{username}:{password}")))
}
