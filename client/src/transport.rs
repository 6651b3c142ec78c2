//! HTTP call boundary.
//!
//! Containers and resource modules talk to [`Transport`], never to an HTTP
//! crate directly; tests substitute a scripted in-memory transport.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;

/// HTTP verbs against a REST backend, returning parsed JSON.
///
/// Implementations reject with [`TransportError::Http`] on any non-2xx
/// response and [`TransportError::Network`] when no response was received.
/// Query parameters and bodies are handed over already shaped; paths are
/// relative to the implementation's base URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, TransportError>;
    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError>;
    async fn put(&self, path: &str, body: Value) -> Result<Value, TransportError>;
    async fn patch(&self, path: &str, body: Value) -> Result<Value, TransportError>;
    async fn delete(&self, path: &str) -> Result<(), TransportError>;
}

/// Deserialize a transport payload into a concrete response type.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value).map_err(|e| TransportError::Local {
        message: format!("failed to parse response: {e}"),
    })
}

/// Serialize a request payload for the wire.
pub(crate) fn encode<T: serde::Serialize>(body: &T) -> Result<Value, TransportError> {
    serde_json::to_value(body).map_err(|e| TransportError::Local {
        message: format!("failed to serialize request: {e}"),
    })
}

/// [`Transport`] implementation over a reqwest client and a base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, TransportError> {
        let response = request.send().await.map_err(|e| TransportError::Network {
            message: e.to_string(),
        })?;
        Self::interpret(response).await
    }

    /// Map a response to parsed JSON or the structured error for its status.
    async fn interpret(response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| TransportError::Network {
            message: e.to_string(),
        })?;
        // Error bodies that are not JSON still surface, as Null.
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };
        if status.is_success() {
            if !text.is_empty() && body.is_null() && text != "null" {
                return Err(TransportError::Local {
                    message: format!("failed to parse response: not JSON ({} bytes)", text.len()),
                });
            }
            Ok(body)
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected by server");
            Err(TransportError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, TransportError> {
        self.send(self.client.get(self.url(path)).query(params)).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.send(self.client.post(self.url(path)).json(&body)).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.send(self.client.put(self.url(path)).json(&body)).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.send(self.client.patch(self.url(path)).json(&body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), TransportError> {
        self.send(self.client.delete(self.url(path))).await?;
        Ok(())
    }
}
