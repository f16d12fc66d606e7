mod app;
mod commands;
mod draw;
mod keys;
mod render;
mod state;
mod tracking;
mod ui;

use crate::app::App;
use crate::commands::Commands;
use crate::state::app_settings::AppSettings;
use crate::state::board::Board;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crate::tracking::{Reconciler, SharedRegistry, TrackingRegistry};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use scoreboard_api::ScoreboardApi;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    // Fail on bad configuration before the terminal is taken over.
    let settings = AppSettings::load()?;

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // One registry, one feed, one board, shared by the commands and the loop.
    let registry = TrackingRegistry::new().shared();
    let feed = Arc::new(ScoreboardApi::new(settings.endpoints.clone()));
    let board = Board::default();
    let sink = Arc::new(board.clone());

    info!(
        "tracking {} every {}s",
        settings.leagues.iter().map(|l| l.code()).collect::<Vec<_>>().join(","),
        settings.poll_interval.as_secs()
    );

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let commands = Commands::new(
        feed.clone(),
        sink.clone(),
        registry.clone(),
        settings.leagues.clone(),
        settings.poll_interval,
    );
    let network_worker = NetworkWorker::new(commands, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Reconciliation loop
    let reconciler = Reconciler::new(feed, sink, registry.clone());
    let refresher = PeriodicRefresher::new(reconciler, settings.poll_interval, ui_event_tx.clone());
    let refresher_task = tokio::spawn(refresher.run());

    let app = Arc::new(Mutex::new(App::new(settings)));

    // Load the scoreboard on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(
        terminal,
        app,
        board,
        registry,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
    )
    .await;

    input_handler.abort();
    network_task.abort();
    refresher_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("scoretrack {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "scoretrack - live NFL/NBA/NHL/MLB scores in the terminal

Usage:
  scoretrack
  scoretrack --help
  scoretrack --version

Environment (a .env file in the working directory is read too):
  SCORETRACK_POLL_SECS         Seconds between tracking passes (default 30)
  SCORETRACK_LEAGUES           Enabled leagues, comma separated (default nfl,nba,nhl,mlb)
  SCORETRACK_FEED_BASE         Scoreboard API root (default ESPN site API)
  SCORETRACK_FEED_URL_<LEAGUE> Full scoreboard URL for one league, e.g. SCORETRACK_FEED_URL_NHL
  SCORETRACK_LOG               Log level: error, warn, info, debug, trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    board: Board,
    registry: SharedRegistry,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        let should_redraw = tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                handle_ui_event(ui_event, &app, &network_requests).await && !loading.is_loading
            }

            Some(response) = network_responses.recv() => {
                handle_network_response(response, &app, &mut loading).await
            }

            _ = board.changed() => {
                let cards = board.cards().await;
                app.lock().await.on_board_changed(cards);
                !loading.is_loading
            }
        };

        if should_redraw {
            let tracked = registry.lock().await.entries().keys().cloned().collect();
            let mut app_guard = app.lock().await;
            app_guard.on_tracking_changed(tracked);
            draw::draw(&mut terminal, &mut app_guard, loading);
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = network_requests.send(NetworkRequest::LoadScores { league: None }).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::PassCompleted(report) => {
            app.lock().await.on_pass_completed(report);
            true
        }
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::ScoresLoaded { league, games } => {
            app.lock().await.on_scores_loaded(league, games);
        }
        NetworkResponse::Notice { message } => {
            info!("{message}");
            app.lock().await.on_notice(message);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            app.lock().await.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        // crossterm's read blocks; keep it off the single runtime thread.
        let event = tokio::task::spawn_blocking(crossterm_event::read).await;
        let Ok(Ok(event)) = event else {
            continue;
        };
        let ui_event = match event {
            Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, where there is nobody left to
/// report a failure to.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
