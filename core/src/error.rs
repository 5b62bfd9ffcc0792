//! Error types for the REST client.
//!
//! # Design
//! `ClientError` is the one error type every client operation returns. Only
//! `Remote` is a domain error: the call reached the server and the server
//! answered with an error payload. Every other variant wraps the failure of a
//! lower layer as-is, without reclassifying it. HTTP status codes never
//! produce an error on their own.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The connection string passed to the constructor is not a valid URL.
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request body could not be serialized to JSON.
    #[error("request serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The transport could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The response body is not valid JSON.
    #[error("response deserialization failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The response payload carried a truthy `error` field.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl ClientError {
    /// The remote error, if this failure was signalled by the server payload.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            ClientError::Remote(err) => Some(err),
            _ => None,
        }
    }
}

/// Failure reported by the remote peer inside an otherwise valid response.
///
/// `code` is whatever the payload put in its `type` field, `Null` if absent.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RemoteError {
    message: String,
    code: Value,
}

impl RemoteError {
    pub fn new(message: impl Into<String>, code: Value) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// Build the error from an error payload: `HTTP Error {type}: {message}`.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        let code = payload.get("type").cloned().unwrap_or(Value::Null);
        let message = format!(
            "HTTP Error {}: {}",
            interpolate(&code),
            interpolate(payload.get("message").unwrap_or(&Value::Null))
        );
        Self { message, code }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &Value {
        &self.code
    }
}

/// Opaque failure from an `HttpTransport`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TransportError(#[from] Box<dyn std::error::Error + Send + Sync>);

impl TransportError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self(err.into())
    }

    /// The underlying error, for downcasting.
    pub fn get_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

/// Whether a payload's `error` field counts as set.
///
/// `null`, `false`, `0`, `""`, `"0"` and `[]` are unset. Objects, even
/// empty ones, are set.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Render a payload field as message text.
fn interpolate(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test payloads are objects"),
        }
    }

    #[test]
    fn remote_error_formats_type_and_message() {
        let err = RemoteError::from_payload(&payload(
            json!({"error": true, "type": 42, "message": "A message"}),
        ));
        assert_eq!(err.message(), "HTTP Error 42: A message");
        assert_eq!(err.code(), &json!(42));
        assert_eq!(err.to_string(), "HTTP Error 42: A message");
    }

    #[test]
    fn remote_error_keeps_string_codes_unquoted() {
        let err = RemoteError::from_payload(&payload(
            json!({"error": 1, "type": "NotFound", "message": "gone"}),
        ));
        assert_eq!(err.message(), "HTTP Error NotFound: gone");
        assert_eq!(err.code(), &json!("NotFound"));
    }

    #[test]
    fn remote_error_tolerates_missing_fields() {
        let err = RemoteError::from_payload(&payload(json!({"error": true})));
        assert_eq!(err.message(), "HTTP Error : ");
        assert_eq!(err.code(), &Value::Null);
    }

    #[test]
    fn truthiness_follows_loose_rules() {
        for falsy in [
            json!(null),
            json!(false),
            json!(0),
            json!(0.0),
            json!(""),
            json!("0"),
            json!([]),
        ] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [
            json!(true),
            json!(1),
            json!(-0.5),
            json!("false"),
            json!([0]),
            json!({}),
        ] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn remote_variant_displays_remote_message() {
        let err = ClientError::from(RemoteError::new("HTTP Error 7: nope", json!(7)));
        assert_eq!(err.to_string(), "HTTP Error 7: nope");
        assert_eq!(err.as_remote().map(RemoteError::code), Some(&json!(7)));
    }

    #[test]
    fn transport_error_exposes_inner_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::new(io);
        assert_eq!(err.to_string(), "refused");
        assert!(err.get_ref().downcast_ref::<std::io::Error>().is_some());
    }
}
