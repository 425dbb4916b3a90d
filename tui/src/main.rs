use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::execute;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use stacks_browser::HierarchyService;
use stacks_client::ClientOptions;
use stacks_client::HttpHierarchyClient;
use stacks_tui::config;
use stacks_tui::run_app;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Browse and edit the migration status of archived assets.
#[derive(Debug, Parser)]
#[command(name = "stacks", version)]
struct Cli {
    /// Hierarchy service base URL (overrides the config file).
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token for the hierarchy service.
    #[arg(long)]
    token: Option<String>,

    /// Path to an alternate config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref()).map_err(color_eyre::eyre::Report::msg)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(token) = cli.token {
        config.token = Some(token);
    }

    let _log_guard = init_logging(&config.log_filter);
    tracing::info!(base_url = config.base_url, "starting stacks browser");

    let mut opts = ClientOptions::new(config.base_url.clone());
    opts.token = config.token.clone();
    let client = HttpHierarchyClient::new(opts)?;
    let service: Arc<dyn HierarchyService> = Arc::new(client);

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, service).await;

    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    result
}

/// Log to a file, never to the terminal: the alternate screen owns stdout.
fn init_logging(filter: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = dirs::data_dir()?.join("stacks").join("log");
    std::fs::create_dir_all(&log_dir).ok()?;
    let appender = tracing_appender::rolling::never(log_dir, "stacks-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}
