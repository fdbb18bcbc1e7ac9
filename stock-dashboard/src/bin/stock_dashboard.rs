/// Stock Dashboard
///
/// One card per instrument with its latest price and recommendation,
/// refreshed on a fixed period. Enter opens the detail view of the selected
/// card, Esc closes it, q quits.
use std::{error::Error, io, sync::Arc, time::Duration};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use stock_dashboard::{
    Dashboard, DashboardConfig, DashboardEvent, HttpQuoteSource, QuoteSource, SharedDashboard,
    card_columns,
    input::{KeyAction, handle_key},
    refresh, render_dashboard, spawn_bulk_refresh, spawn_countdown, spawn_detail_handler,
};
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::EnvFilter;

const TICK_RATE: Duration = Duration::from_millis(250);

/// Log to a daily file; the terminal belongs to the UI
fn init_logging(config: &DashboardConfig) -> Result<WorkerGuard, Box<dyn Error>> {
    std::fs::create_dir_all(&config.log_dir)?;
    let appender = RollingFileAppender::builder()
        .filename_prefix("stock-dashboard")
        .filename_suffix("log")
        .max_log_files(5)
        .rotation(Rotation::DAILY)
        .build(&config.log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = DashboardConfig::from_env()?;
    let _log_guard = init_logging(&config)?;
    info!(
        base_url = %config.base_url,
        refresh_secs = config.refresh_interval.as_secs(),
        "Starting stock dashboard"
    );

    let source: Arc<dyn QuoteSource> = Arc::new(HttpQuoteSource::new(&config)?);
    let state: SharedDashboard = Arc::new(Mutex::new(Dashboard::new(config.clone())));

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Initial load runs alongside the UI so the empty board draws immediately
    let initial = {
        let state = Arc::clone(&state);
        let source = Arc::clone(&source);
        tokio::spawn(async move {
            refresh(&state, source.as_ref()).await;
        })
    };

    let (event_tx, event_rx) = mpsc::channel(16);
    let tasks = [
        initial,
        spawn_bulk_refresh(
            Arc::clone(&state),
            Arc::clone(&source),
            config.refresh_interval,
        ),
        spawn_countdown(Arc::clone(&state), config.countdown_interval),
        spawn_detail_handler(Arc::clone(&state), Arc::clone(&source), event_rx),
    ];

    let result = run_app(&mut terminal, &state, &event_tx).await;

    for task in &tasks {
        task.abort();
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("Stock dashboard stopped");
    result.map_err(Into::into)
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &Mutex<Dashboard>,
    event_tx: &mpsc::Sender<DashboardEvent>,
) -> io::Result<()> {
    loop {
        {
            let dashboard = state.lock().await;
            terminal.draw(|f| render_dashboard(f, &dashboard))?;
        }

        if !event::poll(TICK_RATE)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let columns = card_columns(terminal.size()?.width);
        let action = handle_key(&mut *state.lock().await, key.code, columns);
        match action {
            KeyAction::Quit => return Ok(()),
            KeyAction::Emit(event) => {
                if event_tx.send(event).await.is_err() {
                    warn!("Detail handler stopped, request dropped");
                }
            }
            KeyAction::None => {}
        }
    }
}
