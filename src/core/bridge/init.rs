//! Startup fetch of host-provided values.

use super::{actions, Bridge};

/// Values the host hands the app once at startup.  Anything the host
/// fails to provide is left at its default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    pub user_name: String,
    pub auth_token: String,
    /// Rows covered by host chrome at the top of the screen.
    pub status_bar_height: u16,
}

/// Issue every startup request concurrently and wait for all of them.
pub async fn fetch_host_context(bridge: &Bridge) -> HostContext {
    let (user_name, auth_token, status_bar_height) = tokio::join!(
        bridge.call_or_default::<String>(actions::GET_USER_NAME, None),
        bridge.call_or_default::<String>(actions::GET_AUTH_TOKEN, None),
        bridge.call_or_default::<u16>(actions::GET_STATUS_BAR_HEIGHT, None),
    );
    tracing::info!(
        transport = bridge.transport_name(),
        user = %user_name,
        status_bar_height,
        "bridge: host context ready"
    );
    HostContext {
        user_name,
        auth_token,
        status_bar_height,
    }
}
