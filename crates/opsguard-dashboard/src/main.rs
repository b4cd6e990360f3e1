mod config;
mod state;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::DashboardConfig;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use opsguard_core::{Orchestrator, Scenario, SystemClock};
use opsguard_live::seed::{self, SeedData};
use opsguard_live::{EsClient, LiveConfig, LiveError, LiveSnapshot};
use ratatui::{backend::CrosstermBackend, Terminal};
use state::{Action, App, LiveHandle};
use std::{io, path::PathBuf, sync::Arc};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LIVE_QUEUE_CAPACITY: usize = 4;

#[derive(Parser)]
#[command(name = "opsguard")]
#[command(about = "Incident response dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard (default)
    Run {
        /// Never contact the live backend
        #[arg(long)]
        no_live: bool,
        /// Seconds between scenario restarts
        #[arg(long)]
        loop_secs: Option<u64>,
    },
    /// Store live backend credentials
    Configure {
        #[arg(long)]
        url: String,
        #[arg(long)]
        api_key: String,
    },
    /// Show whether live mode is configured
    Status,
    /// Generate outage telemetry and load it into the live backend
    Seed {
        /// Write bulk NDJSON files here instead of posting them
        #[arg(long)]
        output: Option<PathBuf>,
        /// Random seed for the generated documents
        #[arg(long, default_value_t = seed::DEFAULT_SEED)]
        seed: u64,
        /// Keep existing indices and append to them
        #[arg(long)]
        keep: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command.unwrap_or(Commands::Run {
        no_live: false,
        loop_secs: None,
    }) {
        Commands::Run { no_live, loop_secs } => {
            run(DashboardConfig::resolve(loop_secs, no_live)).await
        }
        Commands::Configure { url, api_key } => configure(&url, &api_key),
        Commands::Status => status(),
        Commands::Seed { output, seed, keep } => seed_backend(output, seed, keep).await,
    }
}

fn configure(url: &str, api_key: &str) -> Result<()> {
    let config = LiveConfig::new(url, api_key);
    if !config.is_complete() {
        anyhow::bail!("both --url and --api-key must be non-empty");
    }
    let path = opsguard_live::config::config_path();
    opsguard_live::config::save(&path, &config)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Live backend configured: {}", config.url);
    println!("Saved to {}", path.display());
    Ok(())
}

fn status() -> Result<()> {
    let path = opsguard_live::config::config_path();
    match opsguard_live::config::resolve().context("Failed to read live config")? {
        Some(config) => {
            println!("Live mode: configured");
            println!("  url: {}", config.url);
            println!("  api key: {}", config.masked_key());
        }
        None => println!("Live mode: not configured (demo data)"),
    }
    println!("Config path: {}", path.display());
    Ok(())
}

async fn seed_backend(output: Option<PathBuf>, seed: u64, keep: bool) -> Result<()> {
    let live = opsguard_live::config::resolve().context("Failed to read live config")?;
    let indices = live
        .as_ref()
        .map(|config| config.indices.clone())
        .unwrap_or_default();
    let data = SeedData::generate(chrono::Utc::now(), seed);
    println!(
        "Generated {} documents: {} logs, {} metrics, {} business, {} incidents",
        data.total(),
        data.logs.len(),
        data.metrics.len(),
        data.business.len(),
        data.incidents.len()
    );

    if let Some(dir) = output {
        let paths = seed::write_bulk_files(&dir, &indices, &data)
            .with_context(|| format!("Failed to write {}", dir.display()))?;
        for path in paths {
            println!("  wrote {}", path.display());
        }
        return Ok(());
    }

    let Some(live) = live else {
        anyhow::bail!("live backend not configured; run `opsguard configure` or pass --output");
    };
    let client = EsClient::new(&live).context("Invalid live config")?;
    let results = seed::seed(&client, &indices, &data, !keep)
        .await
        .with_context(|| format!("Seeding {} failed", live.url))?;
    for result in results {
        let count = result
            .count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {}: {} indexed, {} rejected, {} in index",
            result.index, result.outcome.indexed, result.outcome.failed, count
        );
    }
    Ok(())
}

fn connect_live(config: &DashboardConfig) -> Option<LiveHandle> {
    if !config.live_enabled {
        return None;
    }
    let live_config = match opsguard_live::config::resolve() {
        Ok(Some(live_config)) => live_config,
        Ok(None) => return None,
        Err(err) => {
            warn!(error = %err, "live config unreadable, using demo data");
            return None;
        }
    };
    match opsguard_live::connect(&live_config) {
        Ok(adapter) => {
            info!(url = %live_config.url, "live mode enabled");
            Some(Arc::new(adapter))
        }
        Err(err) => {
            warn!(error = %err, "live client unavailable, using demo data");
            None
        }
    }
}

async fn run(config: DashboardConfig) -> Result<()> {
    let orchestrator = Orchestrator::new(
        Scenario::payment_outage(),
        config.timing(),
        SystemClock::new(),
    )
    .context("Invalid scenario timing")?;
    let mut app = App::new(orchestrator, connect_live(&config));

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, &config).await;
    restore_terminal(&mut terminal)?;

    if let Err(err) = &result {
        eprintln!("opsguard: {err:#}");
    }
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_fetch(live: LiveHandle, tx: mpsc::Sender<Result<LiveSnapshot, LiveError>>) {
    tokio::spawn(async move {
        let result = live.fetch().await;
        let _ = tx.send(result).await;
    });
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<SystemClock>,
    config: &DashboardConfig,
) -> Result<()> {
    let (live_tx, mut live_rx) = mpsc::channel(LIVE_QUEUE_CAPACITY);
    let mut events = EventStream::new();
    let mut refresh = tokio::time::interval_at(
        tokio::time::Instant::now() + config.refresh_period,
        config.refresh_period,
    );

    if app.request_live_fetch() {
        if let Some(live) = app.live().cloned() {
            spawn_fetch(live, live_tx.clone());
        }
    }
    app.start_after(config.boot_delay);
    info!(
        loop_secs = config.loop_period.as_secs(),
        live = app.is_live_configured(),
        "dashboard started"
    );

    loop {
        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        let wait = app.next_wake();
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = refresh.tick() => {
                if app.request_live_fetch() {
                    if let Some(live) = app.live().cloned() {
                        spawn_fetch(live, live_tx.clone());
                    }
                }
            }
            Some(result) = live_rx.recv() => {
                app.apply_live(result);
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match app.handle_key(key) {
                            Action::Quit => break,
                            Action::FetchLive => {
                                if let Some(live) = app.live().cloned() {
                                    spawn_fetch(live, live_tx.clone());
                                }
                            }
                            Action::None => {}
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err).context("Terminal event stream failed"),
                    None => break,
                }
            }
        }
    }

    app.stop();
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config::log_to_stdout() {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}
