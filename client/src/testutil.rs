//! Scripted in-memory transport for unit tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::TransportError;
use crate::transport::Transport;

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Value,
}

/// Transport that answers from a queue of scripted responses and records
/// every call it receives.
#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<Value, TransportError>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_ok(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    pub(crate) fn push_err(&self, err: TransportError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(
        &self,
        method: &'static str,
        path: &str,
        params: Vec<(String, String)>,
        body: Value,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            params,
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response for {method} {path}"))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, TransportError> {
        self.answer("GET", path, params.to_vec(), Value::Null)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.answer("POST", path, Vec::new(), body)
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.answer("PUT", path, Vec::new(), body)
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.answer("PATCH", path, Vec::new(), body)
    }

    async fn delete(&self, path: &str) -> Result<(), TransportError> {
        self.answer("DELETE", path, Vec::new(), Value::Null)
            .map(|_| ())
    }
}
