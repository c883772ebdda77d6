use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use devdash::config::{DashboardConfig, ResolvedConfig};
use devdash::{
    events, ui, App, Batch, Collector, CollectorSource, DashboardSnapshot, DataSource, EngineOptions,
    FileSource, HttpCollector,
};

/// How often the UI drains a live source.
const LIVE_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "devdash")]
#[command(about = "Terminal dashboard for DORA, pipeline, infrastructure and application metrics")]
struct Args {
    /// Collector base URL (e.g., "http://localhost:8080")
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Read a captured GET /metrics response from a file instead
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refresh interval (e.g., "5s", "500ms")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Wait between emitting demo data and refetching (e.g., "500ms")
    #[arg(long)]
    demo_settle: Option<String>,

    /// Per-request timeout (e.g., "10s")
    #[arg(long)]
    timeout: Option<String>,

    /// Batch entries considered for charts
    #[arg(short, long)]
    window: Option<usize>,

    /// Log file for interactive runs
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export one snapshot to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    /// Apply flags on top of the layered config.
    fn apply(&self, config: &mut DashboardConfig) {
        if let Some(ref url) = self.url {
            config.base_url = url.clone();
        }
        if let Some(ref refresh) = self.refresh {
            config.refresh_interval = refresh.clone();
        }
        if let Some(ref settle) = self.demo_settle {
            config.demo_settle_delay = settle.clone();
        }
        if let Some(ref timeout) = self.timeout {
            config.request_timeout = timeout.clone();
        }
        if let Some(window) = self.window {
            config.series_window = window;
        }
        if let Some(ref log_file) = self.log_file {
            config.log_file = log_file.clone();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = DashboardConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    let config = config.validate()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        init_logging(None)?;
        return export_to_file(&args, &config, export_path);
    }

    init_logging(Some(&config.log_file))?;

    if let Some(ref path) = args.file {
        info!(path = %path.display(), "reading batches from file");
        let source = Box::new(FileSource::new(path));
        return run_tui(source, config.engine, config.refresh.interval);
    }

    run_with_collector(&config)
}

/// Install the tracing subscriber, writing to `log_file` or stderr.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devdash=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn build_collector(config: &ResolvedConfig) -> Result<HttpCollector> {
    HttpCollector::builder()
        .base_url(config.base_url.clone())
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Run against the live collector with a background refresh task
fn run_with_collector(config: &ResolvedConfig) -> Result<()> {
    let collector = build_collector(config)?;

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    info!(endpoint = collector.endpoint(), "starting refresh loop");
    let source = CollectorSource::spawn(Arc::new(collector), config.refresh);

    run_tui(Box::new(source), config.engine, LIVE_POLL_INTERVAL)
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, options: EngineOptions, poll_interval: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, options);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app, poll_interval);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    poll_interval: Duration,
) -> Result<()> {
    let mut last_poll = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW);
                }
                // Resize is picked up by the next draw
                _ => {}
            }
        }

        if last_poll.elapsed() >= poll_interval {
            app.reload_data();
            last_poll = Instant::now();
        }
    }

    Ok(())
}

/// Fetch one batch, derive a snapshot and write it as JSON
fn export_to_file(args: &Args, config: &ResolvedConfig, export_path: &Path) -> Result<()> {
    let batch = match args.file {
        Some(ref path) => {
            let mut source = FileSource::new(path);
            match source.poll() {
                Some(batch) => batch,
                None => anyhow::bail!("{}", source.error().unwrap_or("No data in file")),
            }
        }
        None => fetch_once(config)?,
    };

    if batch.skipped() > 0 {
        warn!(skipped = batch.skipped(), "malformed measurements skipped");
    }

    let snapshot = DashboardSnapshot::from_batch(&batch, &config.engine);
    snapshot.export_to(export_path)?;

    println!(
        "Exported {} metrics ({} points) to: {}",
        snapshot.summary.len(),
        snapshot.total_points,
        export_path.display()
    );
    Ok(())
}

fn fetch_once(config: &ResolvedConfig) -> Result<Batch> {
    let collector = build_collector(config)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(collector.fetch_metrics())
        .with_context(|| format!("Failed to fetch metrics from {}", collector.endpoint()))
}
