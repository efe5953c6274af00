use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::Mutex;

use super::client::ChatClient;
use crate::errors::AdapterResult;

/// A mock vendor client that records payloads and returns pre-configured responses
#[derive(Clone, Default)]
pub struct MockClient {
    responses: Arc<Mutex<Vec<Value>>>,
    payloads: Arc<Mutex<Vec<Value>>>,
}

impl MockClient {
    /// Create a new mock client with a sequence of responses
    pub fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every payload sent so far, oldest first
    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn last_payload(&self) -> Value {
        self.payloads().pop().expect("no request was sent")
    }
}

#[async_trait]
impl ChatClient for MockClient {
    async fn create(&self, payload: Value) -> AdapterResult<Value> {
        self.payloads.lock().unwrap().push(payload);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok(Value::Null)
        } else {
            Ok(responses.remove(0))
        }
    }
}
