//! Wiring between the app and its host: transport selection and the
//! table of commands the host may invoke.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::config::{AppConfig, BridgeMode};
use crate::core::bridge::handlers::str_param;
use crate::core::bridge::{
    Bridge, BridgeError, CannedTransport, HostCommand, HostHandlers, ProcessTransport,
};
use crate::core::sheet::SnapState;

use super::state::AppState;

/// Pick the transport once.  `force_canned` (the `--dev` flag) wins over
/// everything; otherwise the config decides.  A `canned.*` entry answers
/// any action without its own canned value.
pub fn build_bridge(
    config: &AppConfig,
    force_canned: bool,
    commands: mpsc::UnboundedSender<HostCommand>,
) -> Result<Bridge, BridgeError> {
    let host_command = config.host_command.as_deref();
    match (force_canned, config.bridge, host_command) {
        (false, BridgeMode::Process, Some(cmd)) => {
            let timeout = Duration::from_millis(config.bridge_timeout_ms);
            Ok(Bridge::new(ProcessTransport::spawn(cmd, commands, timeout)?))
        }
        _ => {
            let mut canned = CannedTransport::default();
            for (action, value) in &config.canned {
                if action == "*" {
                    canned = canned.with_fallback(value.clone());
                } else {
                    canned.insert(action.clone(), value.clone());
                }
            }
            Ok(Bridge::new(canned))
        }
    }
}

fn sheet_command(
    target: SnapState,
) -> impl Fn(&mut AppState, Option<&Value>) -> Result<(), BridgeError> {
    move |state: &mut AppState, _: Option<&Value>| {
        state.request_sheet(target, "host");
        Ok(())
    }
}

/// Commands the host can send, registered once at startup.
pub fn default_handlers() -> HostHandlers<AppState> {
    let mut handlers = HostHandlers::new();
    handlers
        .register("openSheet", sheet_command(SnapState::Open))
        .register("halfSheet", sheet_command(SnapState::Half))
        .register("closeSheet", sheet_command(SnapState::Closed))
        .register("setSheetState", |state: &mut AppState, params| {
            let raw = str_param("setSheetState", params)?;
            let target = raw.parse::<SnapState>().map_err(|e| BridgeError::InvalidParams {
                command: "setSheetState".into(),
                reason: e.to_string(),
            })?;
            state.request_sheet(target, "host");
            Ok(())
        })
        .register("showMessage", |state: &mut AppState, params| {
            let text = str_param("showMessage", params)?;
            state.status_message = Some(text.to_string());
            state.log_activity(format!("host: {text}"));
            Ok(())
        });
    handlers
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use ratatui::layout::Rect;
    use serde_json::json;

    use super::*;
    use crate::app::handler::handle_host_command;

    fn state() -> AppState {
        let mut s = AppState::new(AppConfig::default(), "canned");
        s.prepare_frame(Rect::new(0, 0, 80, 40), Instant::now());
        s.frame_presented();
        s
    }

    fn cmd(name: &str, params: Option<Value>) -> HostCommand {
        HostCommand {
            command: name.into(),
            params,
        }
    }

    #[test]
    fn every_documented_command_is_registered() {
        assert_eq!(
            default_handlers().names(),
            vec!["closeSheet", "halfSheet", "openSheet", "setSheetState", "showMessage"]
        );
    }

    #[test]
    fn host_drives_the_sheet() {
        let handlers = default_handlers();
        let mut s = state();
        handle_host_command(&mut s, &handlers, cmd("openSheet", None));
        assert_eq!(s.sheet().state(), SnapState::Open);
        handle_host_command(&mut s, &handlers, cmd("setSheetState", Some(json!("half"))));
        assert_eq!(s.sheet().state(), SnapState::Half);
    }

    #[test]
    fn bad_host_input_surfaces_in_the_status_bar() {
        let handlers = default_handlers();
        let mut s = state();
        handle_host_command(&mut s, &handlers, cmd("setSheetState", Some(json!("sideways"))));
        assert_eq!(s.sheet().state(), SnapState::Closed);
        assert!(s.status_message.as_deref().unwrap_or_default().contains("sideways"));

        handle_host_command(&mut s, &handlers, cmd("launchRockets", None));
        assert!(s.status_message.as_deref().unwrap_or_default().contains("launchRockets"));
    }

    #[test]
    fn show_message_sets_status() {
        let handlers = default_handlers();
        let mut s = state();
        handle_host_command(&mut s, &handlers, cmd("showMessage", Some(json!("synced"))));
        assert_eq!(s.status_message.as_deref(), Some("synced"));
    }

    #[tokio::test]
    async fn dev_flag_selects_canned_transport() {
        let mut config = AppConfig::default();
        config.bridge = BridgeMode::Process;
        config.host_command = Some("false".into());
        let (tx, _rx) = mpsc::unbounded_channel();
        let bridge = build_bridge(&config, true, tx).unwrap();
        assert_eq!(bridge.transport_name(), "canned");
        let name: Option<String> = bridge.call("getUserName", None).await;
        assert_eq!(name.as_deref(), Some("developer"));
    }

    #[tokio::test]
    async fn wildcard_canned_value_is_the_fallback() {
        let config = AppConfig::parse("canned.* = 7\n");
        let (tx, _rx) = mpsc::unbounded_channel();
        let bridge = build_bridge(&config, false, tx).unwrap();
        assert_eq!(bridge.call::<u32>("getBatteryLevel", None).await, Some(7));
        assert_eq!(bridge.call::<String>("getUserName", None).await.as_deref(), Some("developer"));
    }

    #[tokio::test]
    async fn process_transport_talks_to_a_shell_host() {
        let mut config = AppConfig::default();
        config.bridge = BridgeMode::Process;
        // Answers the first request with "ada" after echoing its id back.
        config.host_command = Some(
            r#"read line; id=$(printf '%s' "$line" | sed 's/.*"id":\([0-9]*\).*/\1/'); printf '{"id":%s,"result":"ada"}\n' "$id"; sleep 1"#
                .into(),
        );
        let (tx, _rx) = mpsc::unbounded_channel();
        let bridge = build_bridge(&config, false, tx).unwrap();
        assert_eq!(bridge.transport_name(), "process");
        let name: Option<String> = bridge.call("getUserName", None).await;
        assert_eq!(name.as_deref(), Some("ada"));
    }
}
