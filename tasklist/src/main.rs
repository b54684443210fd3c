//! `tasklist` — terminal to-do list backed by a document store.
//!
//! Launches the TUI and connects to a `tasklist-store` server. When the
//! store cannot be reached the app falls back to an in-memory list.
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/tasklist/config.toml`).
//!
//! ```bash
//! # Connect to a local store
//! cargo run --bin tasklist -- --store-url ws://127.0.0.1:9100/ws
//!
//! # Offline demo mode
//! cargo run --bin tasklist -- --offline
//!
//! # Or via environment variables
//! TASKLIST_STORE_URL=ws://127.0.0.1:9100/ws cargo run --bin tasklist
//! ```

use std::io;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use tasklist::app::App;
use tasklist::config::{CliArgs, ClientConfig};
use tasklist::dispatch::{self, Command, ControllerEvent};
use tasklist::gateway::Gateway;
use tasklist::gateway::memory::InMemoryGateway;
use tasklist::gateway::remote::RemoteGateway;
use tasklist::tasks::TaskListController;
use tasklist::ui;

/// How long to wait for the controller task to finish on quit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("tasklist starting");

    // Connect before taking over the terminal so connect errors are logged
    // with the fallback decision.
    let backend = connect_backend(&config).await;

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    // Run the app.
    let result = match backend {
        Backend::Remote(gateway) => {
            let info = gateway.store_url().to_string();
            let mut app = App::new();
            app.set_connection_status(true, &info);
            run_app(&mut terminal, app, gateway, &config).await
        }
        Backend::Offline(gateway, reason) => {
            let mut app = App::new();
            app.set_connection_status(false, "Offline demo");
            if let Some(reason) = reason {
                app.set_notice(format!("Could not reach store, changes are not saved ({reason})"));
            }
            run_app(&mut terminal, app, gateway, &config).await
        }
    };

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("tasklist exiting");
    result
}

/// The gateway the app runs against.
enum Backend {
    /// Connected to a store server.
    Remote(RemoteGateway),
    /// In-memory list, with the connect error if the store was unreachable.
    Offline(InMemoryGateway, Option<String>),
}

/// Connect to the configured store, falling back to an in-memory list.
async fn connect_backend(config: &ClientConfig) -> Backend {
    if config.offline {
        tracing::info!("offline mode requested");
        return Backend::Offline(InMemoryGateway::new(), None);
    }
    match RemoteGateway::connect(&config.store_url, config.connect_timeout).await {
        Ok(gateway) => Backend::Remote(gateway),
        Err(e) => {
            tracing::warn!(url = %config.store_url, err = %e, "falling back to offline mode");
            Backend::Offline(InMemoryGateway::new(), Some(e.to_string()))
        }
    }
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("tasklist.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app<G: Gateway + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    gateway: G,
    config: &ClientConfig,
) -> io::Result<()> {
    let controller = TaskListController::new(gateway);
    let (cmd_tx, mut evt_rx, handle) =
        dispatch::spawn_controller(controller, config.channel_capacity);

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all pending controller events (non-blocking).
        drain_controller_events(&mut app, &mut evt_rx);

        // Step 3: Poll for terminal input events. The poll blocks this
        // worker thread, so give the runtime a chance to run the controller.
        let has_event = tokio::task::block_in_place(|| event::poll(config.poll_timeout))?;
        if has_event && let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(cmd) = app.handle_key_event(key) {
                match cmd_tx.try_send(cmd) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        app.set_notice("Busy, input dropped");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        app.set_notice("Task list stopped");
                    }
                }
            }
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(Command::Shutdown);
            drop(cmd_tx);
            drop(evt_rx);
            // A store call in flight has no timeout of its own.
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(err = %e, "controller task failed"),
                Err(_) => tracing::warn!("controller task still busy at exit"),
            }
            return Ok(());
        }
    }
}

/// Drain all pending `ControllerEvent`s and apply them to the app.
fn drain_controller_events(app: &mut App, rx: &mut mpsc::Receiver<ControllerEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            ControllerEvent::Snapshot(snapshot) => app.apply_snapshot(snapshot),
        }
    }
}
