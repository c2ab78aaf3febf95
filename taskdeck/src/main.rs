//! `TaskDeck` — terminal dashboard for a hosted to-do service.
//!
//! Launches the TUI and optionally connects to a to-do service over its
//! REST API. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! # Offline demo mode
//! cargo run --bin taskdeck
//!
//! # Connect to a hosted service
//! cargo run --bin taskdeck -- --api-url https://todo.example.com \
//!     --token "$TOKEN"
//!
//! # Or via environment variables
//! TASKDECK_API_URL=https://todo.example.com TASKDECK_TOKEN=... cargo run
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;
use url::Url;

use taskdeck::api::http::HttpTaskApi;
use taskdeck::api::loopback::LoopbackApi;
use taskdeck::api::{CancelHandle, CancelToken, TaskApi};
use taskdeck::app::{App, Command};
use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::store::SyncEngine;
use taskdeck::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("taskdeck starting");

    // Resolve the backend before taking over the terminal so URL problems
    // are still visible on stderr.
    let api = match build_api(&config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e));
        }
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = match api {
        Backend::Remote { api, label } => run_app(&mut terminal, api, label, &config).await,
        Backend::Offline(api) => {
            run_app(&mut terminal, api, "offline".to_string(), &config).await
        }
    };

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskdeck exiting");
    result
}

/// The backend selected by configuration.
enum Backend {
    /// Hosted service over HTTP.
    Remote {
        api: HttpTaskApi,
        label: String,
    },
    /// In-process demo service.
    Offline(LoopbackApi),
}

/// Picks the backend: the hosted service when an API URL is configured,
/// the in-process demo service otherwise.
fn build_api(config: &ClientConfig) -> Result<Backend, String> {
    let Some(api_config) = config.to_api_config() else {
        tracing::info!("no API URL configured, using offline demo data");
        return Ok(Backend::Offline(LoopbackApi::demo()));
    };

    let base = Url::parse(&api_config.base_url)
        .map_err(|e| format!("invalid API URL {:?}: {e}", api_config.base_url))?;
    let label = base.host_str().unwrap_or("remote").to_string();
    let api = HttpTaskApi::new(&base, api_config.token, api_config.timeout)
        .map_err(|e| e.to_string())?;

    tracing::info!(url = %base, "using hosted task service");
    Ok(Backend::Remote { api, label })
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
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
async fn run_app<A>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    api: A,
    backend_label: String,
    config: &ClientConfig,
) -> io::Result<()>
where
    A: TaskApi + 'static,
{
    let mut app = App::new().with_query(config.default_filter, config.default_sort);
    app.backend_label = backend_label;
    app.date_format.clone_from(&config.date_format);

    let (engine, mut events) = SyncEngine::new(api);

    // Kick off the initial fetch; the handle lets a manual refresh or quit
    // abandon it.
    let mut fetch_cancel = spawn_refresh(&engine);

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all pending store events (non-blocking).
        while let Ok(store_event) = events.try_recv() {
            app.apply_event(store_event);
        }

        // Step 3: Tick UI timers.
        app.tick();

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // handle_key_event returns Some(Command) when the action needs
            // the service; the engine applies it optimistically and reports
            // the outcome through the event channel.
            if let Some(command) = app.handle_key_event(key) {
                match command {
                    Command::Refresh => {
                        fetch_cancel.cancel();
                        fetch_cancel = spawn_refresh(&engine);
                    }
                    Command::Create(draft) => {
                        let engine = Arc::clone(&engine);
                        tokio::spawn(async move {
                            let _ = engine.create(draft).await;
                        });
                    }
                    Command::Update(id, patch) => {
                        let engine = Arc::clone(&engine);
                        tokio::spawn(async move {
                            let _ = engine.update(id, patch).await;
                        });
                    }
                    Command::Delete(id) => {
                        let engine = Arc::clone(&engine);
                        tokio::spawn(async move {
                            let _ = engine.delete(id).await;
                        });
                    }
                }
            }
        }

        if app.should_quit {
            fetch_cancel.cancel();
            return Ok(());
        }
    }
}

/// Spawns a cancellable full fetch and returns its cancellation handle.
fn spawn_refresh<A>(engine: &Arc<SyncEngine<A>>) -> CancelHandle
where
    A: TaskApi + 'static,
{
    let (handle, token) = CancelToken::pair();
    let engine = Arc::clone(engine);
    tokio::spawn(async move {
        let _ = engine.refresh(token).await;
    });
    handle
}
