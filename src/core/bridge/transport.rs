//! Outbound transports.
//!
//! The rest of the app only sees [`Transport`]; which implementation sits
//! behind it is decided once when the [`super::Bridge`] is built.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::error::Result;

/// Request/response channel to the host.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Invoke `action` on the host.  `Ok(None)` means the host answered
    /// without a value.
    async fn call(&self, action: &str, params: Option<Value>) -> Result<Option<Value>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Development stand-in that answers every call from a fixed table and
/// never touches the real host.
#[derive(Debug, Clone, Default)]
pub struct CannedTransport {
    responses: HashMap<String, Value>,
    fallback: Option<Value>,
}

impl CannedTransport {
    /// Value returned for actions with no entry of their own.
    pub fn with_fallback(mut self, value: Value) -> Self {
        self.fallback = Some(value);
        self
    }

    pub fn insert(&mut self, action: impl Into<String>, value: Value) {
        self.responses.insert(action.into(), value);
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn call(&self, action: &str, params: Option<Value>) -> Result<Option<Value>> {
        let value = self
            .responses
            .get(action)
            .or(self.fallback.as_ref())
            .cloned();
        tracing::debug!(action, ?params, ?value, "bridge: canned response");
        Ok(value)
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}
