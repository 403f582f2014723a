mod config;
mod error;
mod render;
mod store;
mod task;
mod task_list;
mod ui;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs::OpenOptions, io, path::PathBuf, sync::Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings};
use crate::render::RowRenderer;
use crate::store::{HttpTaskStore, MemoryTaskStore, TaskStore};
use crate::task_list::TaskList;

#[derive(Debug, Parser)]
#[command(name = "taskers", about = "Terminal client for a remote task list")]
struct Cli {
    /// TOML settings file (defaults to ./taskers.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the task store; tasks stay in memory when unset
    #[arg(long)]
    store_url: Option<String>,
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.store_url {
        settings.store_url = Some(url);
    }
    if let Some(path) = cli.log_file {
        settings.log_file = path;
    }
    init_logging(&settings)?;

    let store = open_store(&settings)?;
    let locale = settings.resolve_locale(|key| std::env::var(key).ok())?;
    info!(?locale, date_format = %settings.date_format, "rendering dates");
    let renderer = RowRenderer::new(settings.date_format.clone()).with_locale(locale);
    let mut list = TaskList::new(store, renderer);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")?;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut list, &runtime);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.context("terminal ui failed")
}

fn init_logging(settings: &Settings) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_file)
        .with_context(|| format!("failed to open log file {}", settings.log_file.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn open_store(settings: &Settings) -> anyhow::Result<Box<dyn TaskStore>> {
    match &settings.store_url {
        Some(url) => {
            info!(%url, "using remote task store");
            let store = HttpTaskStore::new(url, settings.request_timeout())
                .with_context(|| format!("cannot use task store at {url}"))?;
            Ok(Box::new(store))
        }
        None => {
            info!("no store url configured; keeping tasks in memory");
            Ok(Box::new(MemoryTaskStore::new()))
        }
    }
}
