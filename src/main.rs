use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dbwatch::commands::{self, Command};
use dbwatch::settings::{Overrides, Settings};
use dbwatch::{events, logging, ui, App, Intervals, RefreshScheduler, SnapshotFetcher, Thresholds};
use dbwatch_client::MonitoringService;
use dbwatch_types::Category;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dbwatch")]
#[command(about = "Terminal dashboard for Redis, Kafka, MySQL and PostgreSQL monitoring")]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Monitoring backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Category shown first in the dashboard
    #[arg(long, default_value = "kafka")]
    category: Category,

    /// Start polling immediately instead of waiting for `m`
    #[arg(long)]
    start: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        base_url: args.base_url,
        log_file: args.log_file,
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;
    let rt = tokio::runtime::Runtime::new()?;

    if let Some(command) = args.command {
        logging::init_stderr(&settings.log_level)?;
        let ok = rt.block_on(commands::run(command, &settings))?;
        if !ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    logging::init_tui(&settings.log_level, settings.log_file.as_deref())?;
    info!(base_url = %settings.api_base_url, "starting dashboard");

    let fetcher: Arc<dyn SnapshotFetcher> = Arc::new(MonitoringService::new(settings.api_client()?));
    let scheduler = RefreshScheduler::new(fetcher, rt.handle().clone());
    let intervals = Intervals {
        dashboard: settings.dashboard_interval(),
        detail: settings.detail_interval(),
    };
    let mut app = App::new(scheduler, args.category, intervals, Thresholds::default());
    if args.start {
        app.toggle_monitoring();
    }

    run_tui(&mut app)
}

/// Run the TUI until the user quits
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.poll();
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::TABLE_FIRST_ROW);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
