use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dashkeys::app::App;
use dashkeys::config::{Config, LoggingConfig};
use dashkeys::crud::memory::sample_items;
use dashkeys::crud::InMemoryCrud;
use dashkeys::event_loop::run_app;
use dashkeys::notes::NoteStore;

fn main() -> Result<()> {
    // Check if we're in a proper terminal
    if !io::stdin().is_terminal() {
        anyhow::bail!("dashkeys must be run in an interactive terminal");
    }

    let config = Config::load().context("Failed to load config")?;
    init_logging(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting dashkeys");

    let crud = Arc::new(InMemoryCrud::with_items(sample_items()));
    let notes = NoteStore::open_default()?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode - are you in a terminal?")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(config, crud, notes);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal (always try to restore even on error)
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    if let Err(e) = &result {
        error!(error = %e, "event loop failed");
    }
    info!("dashkeys exited");
    result
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let path = logging.log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("DASHKEYS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
