//! Browse command implementation
//!
//! Interactive delivery log browser. Fetches run on spawned tasks and report
//! back over a channel; the sequence guard in [`LogExplorer`] makes sure only
//! the latest issued fetch is applied, whatever order responses arrive in.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::FutureExt;
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::{
    io::{self, Stdout},
    sync::Arc,
    time::Duration,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, Instant};
use tracing::{debug, warn};

use hookhub_console::client::{validate_hours, DeliveryApi};
use hookhub_console::error::Result as ApiResult;
use hookhub_console::logs::{LogExplorer, LogQuery, PendingFetch};
use hookhub_console::models::DeliveryAttemptRecord;
use hookhub_console::ui::{AppAction, LogsApp, Notice, WindowPreset};

type Completed = (PendingFetch, ApiResult<Vec<DeliveryAttemptRecord>>);

/// Execute the browse command
///
/// # Arguments
/// * `api` - Shared API client
/// * `hours` - Initial window (24, 48 or 72); `None` loads the most recent logs
/// * `refresh_seconds` - Auto-refresh interval, 0 disables
pub async fn execute(
    api: Arc<dyn DeliveryApi>,
    hours: Option<u32>,
    refresh_seconds: u64,
) -> Result<()> {
    validate_hours(hours)?;
    let window = WindowPreset::from_hours(hours);
    if window.hours() != hours {
        anyhow::bail!("Invalid window: {:?}. Must be one of: 24, 48, 72", hours);
    }

    let mut app = LogsApp::new(LogExplorer::new(), window);
    if let Err(e) = app.explorer.reload_directory(api.as_ref()).await {
        warn!(error = %e, "Could not load subscriptions");
        app.notice = Some(Notice::Error(format!("Failed to load subscriptions: {}", e)));
    }

    let mut terminal = setup_terminal()?;
    let result = run_browser(&mut terminal, &mut app, api, refresh_seconds).await;
    let restored = restore_terminal(&mut terminal);

    // A browser error wins over a restore error
    result.and(restored)
}

/// Enter raw mode and the alternate screen, undoing both if a later step fails
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let entered = (|| -> Result<Terminal<CrosstermBackend<Stdout>>> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        Ok(terminal)
    })();

    undo_on_error(entered, || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })
}

/// Run `undo` when `result` is an error, then hand the result back unchanged
fn undo_on_error<T>(result: Result<T>, undo: impl FnOnce()) -> Result<T> {
    if result.is_err() {
        undo();
    }
    result
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_browser<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut LogsApp,
    api: Arc<dyn DeliveryApi>,
    refresh_seconds: u64,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Completed>();
    let mut refresh_timer = (refresh_seconds > 0).then(|| {
        let period = Duration::from_secs(refresh_seconds);
        interval_at(Instant::now() + period, period)
    });

    // Initial fetch
    let initial = app.window_query();
    dispatch(app, initial, &api, &tx);

    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key) {
                        AppAction::Quit => return Ok(()),
                        AppAction::Fetch(query) => dispatch(app, query, &api, &tx),
                        AppAction::None => {}
                    }
                }
            }
        }

        drain_completed(app, &mut rx);

        if let Some(timer) = refresh_timer.as_mut() {
            if timer.tick().now_or_never().is_some() && !app.explorer.is_loading() {
                let query = app
                    .explorer
                    .last_query()
                    .cloned()
                    .unwrap_or_else(|| app.window_query());
                dispatch(app, query, &api, &tx);
            }
        }
    }
}

/// Validate and issue `query` on a background task
fn dispatch(
    app: &mut LogsApp,
    query: LogQuery,
    api: &Arc<dyn DeliveryApi>,
    tx: &UnboundedSender<Completed>,
) {
    let pending = match app.explorer.begin(query) {
        Ok(pending) => pending,
        Err(e) => {
            app.reject(e);
            return;
        }
    };

    debug!(seq = pending.ticket.seq(), query = %pending.query.describe(), "Issuing fetch");
    let api = Arc::clone(api);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = pending.query.execute(api.as_ref()).await;
        // Receiver is gone once the browser exits
        let _ = tx.send((pending, result));
    });
}

fn drain_completed(app: &mut LogsApp, rx: &mut UnboundedReceiver<Completed>) {
    while let Ok((pending, result)) = rx.try_recv() {
        let query = pending.query.clone();
        let outcome = app.explorer.complete(pending, result);
        app.apply(&query, outcome);
    }
}
