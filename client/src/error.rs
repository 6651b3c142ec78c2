//! Error taxonomy for the client layer.
//!
//! The transport boundary produces a tagged [`TransportError`]; everything
//! above it stores and returns the normalized [`ApiError`] shape, so the
//! request-state and collection-state containers expose one uniform error
//! type to consumers.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Failure raised at the HTTP call boundary.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request never produced an HTTP response (DNS, refused connection,
    /// dropped socket).
    #[error("network error: {message}")]
    Network { message: String },
    /// The server answered with a non-2xx status. `body` is the parsed error
    /// envelope, or `Value::Null` when the body was empty or not JSON.
    #[error("http error: status {status}")]
    Http { status: u16, body: Value },
    /// Failure before or after the wire: serialization, response decoding.
    #[error("{message}")]
    Local { message: String },
}

/// Normalized error stored in request state and returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub message: String,
    /// HTTP status, or `None` when the failure had no HTTP response.
    pub status: Option<u16>,
    /// Per-field validation errors from the server's error envelope.
    pub errors: BTreeMap<String, Vec<String>>,
    /// Server-provided `detail` string, if any.
    pub detail: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Error for a failure with no HTTP response attached.
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            errors: BTreeMap::new(),
            detail: None,
        }
    }

    pub fn is_validation_error(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network { message } | TransportError::Local { message } => {
                ApiError::local(message)
            }
            TransportError::Http { status, body } => {
                let detail = body
                    .get("detail")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let errors = field_errors(&body);
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| detail.clone())
                    .or_else(|| first_non_field_error(&body))
                    .unwrap_or_else(|| format!("request failed with status {status}"));
                Self {
                    message,
                    status: Some(status),
                    errors,
                    detail,
                }
            }
        }
    }
}

/// Pull `{field: [messages]}` out of the envelope's `errors` object.
/// A bare string value is treated as a single-message list.
fn field_errors(body: &Value) -> BTreeMap<String, Vec<String>> {
    let mut errors = BTreeMap::new();
    let Some(map) = body.get("errors").and_then(Value::as_object) else {
        return errors;
    };
    for (field, value) in map {
        let messages = match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        if !messages.is_empty() {
            errors.insert(field.clone(), messages);
        }
    }
    errors
}

fn first_non_field_error(body: &Value) -> Option<String> {
    body.get("non_field_errors")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_str)
        .map(str::to_string)
}
