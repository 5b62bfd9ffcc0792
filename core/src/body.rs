//! Request body input.
//!
//! # Design
//! A body is either absent, text sent exactly as given, or a JSON value that
//! is serialized when the request is built. Conversions pick the variant, so
//! callers pass `()`, a string, or a `serde_json::Value` and never name the
//! enum. A JSON string value is sent as raw text, not as a quoted JSON
//! string; use `Body::json` to force JSON encoding of a string.

use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body is sent.
    #[default]
    Empty,
    /// Sent verbatim.
    Raw(String),
    /// Serialized to JSON text at build time.
    Json(Value),
}

impl Body {
    /// Convert any serializable value into a JSON body.
    ///
    /// Unlike `From<Value>`, strings stay JSON strings here.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ClientError> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(ClientError::Serialization)
    }

    /// The text to put on the wire, if any.
    pub(crate) fn encode(&self) -> Result<Option<String>, ClientError> {
        match self {
            Body::Empty => Ok(None),
            Body::Raw(text) => Ok(Some(text.clone())),
            Body::Json(value) => serde_json::to_string(value)
                .map(Some)
                .map_err(ClientError::Serialization),
        }
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Body::Empty
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Raw(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Raw(text)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Body::Empty,
            Value::String(text) => Body::Raw(text),
            other => Body::Json(other),
        }
    }
}

impl From<&Value> for Body {
    fn from(value: &Value) -> Self {
        Body::from(value.clone())
    }
}

impl<T: Into<Body>> From<Option<T>> for Body {
    fn from(value: Option<T>) -> Self {
        value.map_or(Body::Empty, Into::into)
    }
}
