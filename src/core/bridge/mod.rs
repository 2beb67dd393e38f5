//! Messaging bridge between the app and its host.
//!
//! Two directions:
//! * host → app: fire-and-forget [`HostCommand`]s dispatched through a
//!   [`HostHandlers`] registration table;
//! * app → host: request/response calls made through [`Bridge`], which
//!   hides whether a real or canned [`Transport`] answers.

pub mod error;
pub mod handlers;
pub mod init;
pub mod protocol;
pub mod stream;
pub mod transport;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::BridgeError;
pub use handlers::HostHandlers;
pub use init::{fetch_host_context, HostContext};
pub use protocol::HostCommand;
pub use stream::{ProcessTransport, StreamTransport};
pub use transport::{CannedTransport, Transport};

/// Action names the app calls on the host.
pub mod actions {
    pub const GET_USER_NAME: &str = "getUserName";
    pub const GET_AUTH_TOKEN: &str = "getAuthToken";
    pub const GET_STATUS_BAR_HEIGHT: &str = "getStatusBarHeight";
}

/// Caller-facing handle.  Cheap to clone; the transport is fixed for the
/// lifetime of the bridge.
#[derive(Clone)]
pub struct Bridge {
    transport: Arc<dyn Transport>,
}

impl Bridge {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Call `action` and decode its result.  Transport errors and values
    /// that don't decode as `T` are logged and reported as absent.
    pub async fn call<T: DeserializeOwned>(&self, action: &str, params: Option<Value>) -> Option<T> {
        match self.transport.call(action, params).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!(action, "bridge: unexpected result type: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(action, transport = self.transport.name(), "bridge: call failed: {e}");
                None
            }
        }
    }

    /// Like [`Bridge::call`], substituting `T::default()` for absence.
    pub async fn call_or_default<T>(&self, action: &str, params: Option<Value>) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.call(action, params).await.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn call_decodes_typed_result() {
        let mut canned = CannedTransport::default();
        canned.insert("getStatusBarHeight", json!(2));
        let bridge = Bridge::new(canned);
        assert_eq!(bridge.call::<u16>("getStatusBarHeight", None).await, Some(2));
    }

    #[tokio::test]
    async fn wrong_type_becomes_absent() {
        let mut canned = CannedTransport::default();
        canned.insert("getStatusBarHeight", json!("tall"));
        let bridge = Bridge::new(canned);
        assert_eq!(bridge.call::<u16>("getStatusBarHeight", None).await, None);
        assert_eq!(bridge.call_or_default::<u16>("getStatusBarHeight", None).await, 0);
    }

    #[tokio::test]
    async fn missing_value_defaults() {
        let bridge = Bridge::new(CannedTransport::default());
        assert_eq!(bridge.call_or_default::<String>("getUserName", None).await, "");
        assert_eq!(bridge.transport_name(), "canned");
    }
}
