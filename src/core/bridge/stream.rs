//! Real transport: JSON lines over a byte stream.
//!
//! Two background tasks own the stream halves.  The writer drains an
//! outbound queue; the reader routes responses to the waiting caller by id
//! and forwards host commands to the UI loop.  Both tasks are aborted when
//! the transport is dropped.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::error::{BridgeError, Result};
use super::protocol::{BridgeRequest, BridgeResponse, HostCommand, Inbound};
use super::transport::Transport;

type PendingMap = HashMap<u64, oneshot::Sender<BridgeResponse>>;

pub struct StreamTransport {
    outbound: mpsc::UnboundedSender<String>,
    pending: Arc<Mutex<PendingMap>>,
    closed: Arc<AtomicBool>,
    next_id: AtomicU64,
    timeout: Duration,
    tasks: [JoinHandle<()>; 2],
}

impl StreamTransport {
    /// Start the reader/writer tasks.  Host commands are delivered on
    /// `commands`; must be called inside a tokio runtime.
    pub fn spawn<R, W>(
        reader: R,
        writer: W,
        commands: mpsc::UnboundedSender<HostCommand>,
        timeout: Duration,
    ) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let pending: Arc<Mutex<PendingMap>> = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        let writer_task = tokio::spawn(write_loop(writer, out_rx));
        let reader_task = tokio::spawn(read_loop(
            reader,
            Arc::clone(&pending),
            Arc::clone(&closed),
            commands,
        ));

        Self {
            outbound: out_tx,
            pending,
            closed,
            next_id: AtomicU64::new(1),
            timeout,
            tasks: [writer_task, reader_task],
        }
    }

    fn forget(&self, id: u64) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

impl Drop for StreamTransport {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[async_trait]
impl Transport for StreamTransport {
    async fn call(&self, action: &str, params: Option<Value>) -> Result<Option<Value>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let line = serde_json::to_string(&BridgeRequest {
            id,
            action: action.to_string(),
            params,
        })?;

        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);

        // The reader sets `closed` before draining, so either the drain
        // drops our sender or we observe the flag here.
        if self.closed.load(Ordering::Acquire) || self.outbound.send(line).is_err() {
            self.forget(id);
            return Err(BridgeError::Closed);
        }
        tracing::debug!(id, action, "bridge: request sent");

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(_)) => return Err(BridgeError::Closed),
            Err(_) => {
                self.forget(id);
                return Err(BridgeError::Timeout {
                    action: action.to_string(),
                    timeout: self.timeout,
                });
            }
        };

        match response.error {
            Some(message) => Err(BridgeError::Remote {
                action: action.to_string(),
                message,
            }),
            None => Ok(response.result),
        }
    }

    fn name(&self) -> &'static str {
        "stream"
    }
}

async fn write_loop<W>(mut writer: W, mut lines: mpsc::UnboundedReceiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = lines.recv().await {
        line.push('\n');
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            tracing::warn!("bridge: write failed: {e}");
            break;
        }
        if let Err(e) = writer.flush().await {
            tracing::warn!("bridge: flush failed: {e}");
            break;
        }
    }
}

async fn read_loop<R>(
    reader: R,
    pending: Arc<Mutex<PendingMap>>,
    closed: Arc<AtomicBool>,
    commands: mpsc::UnboundedSender<HostCommand>,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("bridge: read failed: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match Inbound::parse(line) {
            Ok(Inbound::Response(resp)) => {
                let waiter = pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&resp.id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(resp);
                    }
                    None => tracing::debug!(id = resp.id, "bridge: response for unknown id"),
                }
            }
            Ok(Inbound::Command(cmd)) => {
                tracing::debug!(command = %cmd.command, "bridge: host command");
                if commands.send(cmd).is_err() {
                    // UI loop is gone; keep serving responses.
                    tracing::debug!("bridge: command receiver dropped");
                }
            }
            Err(e) => tracing::warn!("bridge: ignoring malformed line: {e}"),
        }
    }

    closed.store(true, Ordering::Release);
    pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
    tracing::debug!("bridge: host stream closed");
}

// ───────────────────────────────────────── process host ──────

/// Runs the host as a child process speaking JSON lines on stdio.
pub struct ProcessTransport {
    inner: StreamTransport,
    // Held for `kill_on_drop`.
    _child: Child,
}

impl ProcessTransport {
    pub fn spawn(
        command: &str,
        commands: mpsc::UnboundedSender<HostCommand>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or(BridgeError::Closed)?;
        let stdout = child.stdout.take().ok_or(BridgeError::Closed)?;
        tracing::info!(command, pid = ?child.id(), "bridge: host process started");

        Ok(Self {
            inner: StreamTransport::spawn(stdout, stdin, commands, timeout),
            _child: child,
        })
    }
}

#[async_trait]
impl Transport for ProcessTransport {
    async fn call(&self, action: &str, params: Option<Value>) -> Result<Option<Value>> {
        self.inner.call(action, params).await
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{duplex, split, DuplexStream, ReadHalf, WriteHalf};

    struct Host {
        lines: tokio::io::Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl Host {
        async fn next_request(&mut self) -> BridgeRequest {
            let line = self.lines.next_line().await.unwrap().unwrap();
            serde_json::from_str(&line).unwrap()
        }

        async fn send(&mut self, value: Value) {
            let mut line = value.to_string();
            line.push('\n');
            self.writer.write_all(line.as_bytes()).await.unwrap();
        }
    }

    fn connect(
        timeout: Duration,
    ) -> (StreamTransport, Host, mpsc::UnboundedReceiver<HostCommand>) {
        let (app_side, host_side) = duplex(4096);
        let (app_read, app_write) = split(app_side);
        let (host_read, host_write) = split(host_side);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let transport = StreamTransport::spawn(app_read, app_write, cmd_tx, timeout);
        let host = Host {
            lines: BufReader::new(host_read).lines(),
            writer: host_write,
        };
        (transport, host, cmd_rx)
    }

    #[tokio::test]
    async fn call_round_trips_through_host() {
        let (transport, mut host, _cmds) = connect(Duration::from_secs(5));

        let host_task = tokio::spawn(async move {
            let req = host.next_request().await;
            assert_eq!(req.action, "getUserName");
            host.send(json!({"id": req.id, "result": "ada"})).await;
            host
        });

        let got = transport.call("getUserName", None).await.unwrap();
        assert_eq!(got, Some(json!("ada")));
        host_task.await.unwrap();
    }

    #[tokio::test]
    async fn remote_error_is_surfaced() {
        let (transport, mut host, _cmds) = connect(Duration::from_secs(5));

        tokio::spawn(async move {
            let req = host.next_request().await;
            host.send(json!({"id": req.id, "error": "not signed in"})).await;
            host
        });

        let err = transport.call("getAuthToken", None).await.unwrap_err();
        assert!(matches!(err, BridgeError::Remote { ref message, .. } if message == "not signed in"));
    }

    #[tokio::test]
    async fn out_of_order_responses_reach_their_callers() {
        let (transport, mut host, _cmds) = connect(Duration::from_secs(5));

        tokio::spawn(async move {
            let a = host.next_request().await;
            let b = host.next_request().await;
            host.send(json!({"id": b.id, "result": b.action})).await;
            host.send(json!({"id": a.id, "result": a.action})).await;
            host
        });

        let (x, y) = tokio::join!(transport.call("first", None), transport.call("second", None));
        assert_eq!(x.unwrap(), Some(json!("first")));
        assert_eq!(y.unwrap(), Some(json!("second")));
    }

    #[tokio::test]
    async fn host_commands_are_forwarded() {
        let (_transport, mut host, mut cmds) = connect(Duration::from_secs(5));

        host.send(json!({"command": "setSheetState", "params": "open"}))
            .await;
        let cmd = cmds.recv().await.unwrap();
        assert_eq!(cmd.command, "setSheetState");
        assert_eq!(cmd.params, Some(json!("open")));
    }

    #[tokio::test]
    async fn silent_host_times_out() {
        let (transport, _host, _cmds) = connect(Duration::from_millis(50));
        let err = transport.call("getUserName", None).await.unwrap_err();
        assert!(matches!(err, BridgeError::Timeout { .. }));
    }

    #[tokio::test]
    async fn closed_host_fails_pending_calls() {
        let (transport, host, _cmds) = connect(Duration::from_secs(5));
        drop(host);
        let err = transport.call("getUserName", None).await.unwrap_err();
        assert!(matches!(err, BridgeError::Closed));
    }
}
