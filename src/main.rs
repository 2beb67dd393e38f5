//! A three-state swipeable bottom sheet for the terminal.
//!
//! Drag the sheet's handle with the mouse, use the keyboard, or let a host
//! process drive it over the JSON-lines bridge.  Run with `--dev` to answer
//! bridge calls from canned values instead of a real host.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{backend::CrosstermBackend, widgets::Paragraph, Frame, Terminal};
use tokio::sync::mpsc;

use crate::app::{
    event::{AppEvent, EventSource},
    handler, host,
    state::AppState,
    terminal::TerminalSession,
};
use crate::config::AppConfig;
use crate::core::bridge::{fetch_host_context, HostCommand};
use crate::core::sheet::SnapState;
use crate::ui::{background::Background, sheet_widget::SheetWidget, theme::Theme};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Swipeable bottom sheet in the terminal")]
struct Cli {
    /// Config file (defaults to `$XDG_CONFIG_HOME/snap-sheet/config.toml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// State the sheet starts in: open, half or closed.
    #[arg(long)]
    initial: Option<SnapState>,

    /// Answer bridge calls with canned values instead of a real host.
    #[arg(long, env = "SNAP_SHEET_DEV")]
    dev: bool,

    /// Host command to spawn for the bridge (implies `bridge = process`).
    #[arg(long, env = "SNAP_SHEET_HOST")]
    host: Option<String>,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    write_config: bool,

    /// Append logs to this file (filtered by `RUST_LOG`).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── rendering ────────

fn render(frame: &mut Frame, state: &AppState) {
    let layout = state.layout();

    if layout.inset_area.height > 0 {
        let chrome = Paragraph::new(format!(" host · {}", state.transport)).style(Theme::inset_style());
        frame.render_widget(chrome, layout.inset_area);
    }

    frame.render_widget(
        Background {
            selected: state.selected_marker,
        },
        layout.container,
    );

    let sheet = state.sheet();
    let activity: Vec<String> = state.activity.iter().cloned().collect();
    let motion = if sheet.is_dragging() {
        "tracking"
    } else if state.animator.is_animating() {
        "easing"
    } else {
        "resting"
    };
    frame.render_widget(
        SheetWidget {
            geometry: state.sheet_geometry(),
            state: sheet.state(),
            motion,
            dragging: sheet.is_dragging(),
            position: state.animator.position(),
            container_height: sheet.container_height().unwrap_or_default(),
            snaps: sheet.snap_positions(),
            user_name: &state.host.user_name,
            transport: state.transport,
            activity: &activity,
        },
        layout.container,
    );

    let hint = state.config.status_bar_hint();
    let status_text = state.status_message.as_deref().unwrap_or(&hint);
    let status = Paragraph::new(status_text).style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    // ── configuration ─────────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut config = AppConfig::load_from(&config_path);
    if let Some(initial) = cli.initial {
        config.sheet.initial = initial;
    }
    if let Some(cmd) = cli.host.clone() {
        config.bridge = config::BridgeMode::Process;
        config.host_command = Some(cmd);
    }
    if cli.write_config {
        config.save_to(&config_path)?;
        println!("{}", config_path.display());
        return Ok(());
    }

    // ── bridge ────────────────────────────────────────────────
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<HostCommand>();
    let bridge = host::build_bridge(&config, cli.dev, cmd_tx).context("starting host bridge")?;
    let handlers = host::default_handlers();
    tracing::info!(
        transport = bridge.transport_name(),
        commands = ?handlers.names(),
        "bridge ready"
    );

    let init_bridge = bridge.clone();
    let mut host_init = tokio::spawn(async move { fetch_host_context(&init_bridge).await });
    let mut host_init_done = false;

    let frame_interval = Duration::from_millis(config.frame_ms);
    let mut state = AppState::new(config, bridge.transport_name());

    // ── terminal setup ────────────────────────────────────────
    let mut session = TerminalSession::enter()?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;
    let mut events = EventSource::spawn(frame_interval);

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| {
            state.prepare_frame(frame.area(), Instant::now());
            render(frame, &state);
        })?;
        // Transitions stay off until the first frame is on screen.
        state.frame_presented();

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(w, h) => handler::handle_resize(&mut state, w, h),
                    AppEvent::Tick => {}
                }
            }

            Some(command) = cmd_rx.recv() => {
                handler::handle_host_command(&mut state, &handlers, command);
            }

            joined = &mut host_init, if !host_init_done => {
                host_init_done = true;
                match joined {
                    Ok(ctx) => state.set_host_context(ctx),
                    Err(e) => tracing::warn!("host init task failed: {e}"),
                }
            }

            else => break,
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    events.dispose();
    session.restore();
    terminal.show_cursor()?;

    println!("{}", state.sheet().state());
    Ok(())
}
