use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let mut request: Option<NetworkRequest> = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Scoreboard),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Tracked),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Scoreboard navigation
        (MenuItem::Scoreboard, Char('l') | KeyCode::Right, _) => {
            guard.state.scoreboard.next_league();
            if let Some(league) = guard.state.scoreboard.current_league()
                && !guard.state.scoreboard.games.contains_key(&league)
            {
                request = Some(NetworkRequest::LoadScores { league: Some(league) });
            }
        }
        (MenuItem::Scoreboard, Char('h') | KeyCode::Left, _) => {
            guard.state.scoreboard.prev_league();
            if let Some(league) = guard.state.scoreboard.current_league()
                && !guard.state.scoreboard.games.contains_key(&league)
            {
                request = Some(NetworkRequest::LoadScores { league: Some(league) });
            }
        }
        (MenuItem::Scoreboard, Char('j') | KeyCode::Down, _) => guard.state.scoreboard.game_down(),
        (MenuItem::Scoreboard, Char('k') | KeyCode::Up, _) => guard.state.scoreboard.game_up(),
        (MenuItem::Scoreboard, KeyCode::Enter, _) => {
            if let Some((league, number)) = guard.state.scoreboard.selected_number() {
                request = Some(NetworkRequest::TrackGame { league, number });
            }
        }
        (MenuItem::Scoreboard, Char('t'), _) => {
            let league = guard.state.scoreboard.current_league();
            request = league.map(|league| NetworkRequest::TrackLeague { league: Some(league) });
        }
        (MenuItem::Scoreboard, Char('T'), _) => {
            request = Some(NetworkRequest::TrackLeague { league: None });
        }
        (MenuItem::Scoreboard, Char('r'), _) => {
            let league = guard.state.scoreboard.current_league();
            request = league.map(|league| NetworkRequest::LoadScores { league: Some(league) });
        }
        (MenuItem::Scoreboard, Char('R'), _) => {
            request = Some(NetworkRequest::LoadScores { league: None });
        }

        // Tracked board
        (MenuItem::Tracked, Char('j') | KeyCode::Down | Char('l') | KeyCode::Right, _) => {
            guard.state.board.select_next();
        }
        (MenuItem::Tracked, Char('k') | KeyCode::Up | Char('h') | KeyCode::Left, _) => {
            guard.state.board.select_prev();
        }
        (MenuItem::Tracked, Char('x') | KeyCode::Delete, _) => {
            if let Some(handle) = guard.state.board.selected_handle() {
                request = Some(NetworkRequest::DismissCard { handle });
            }
        }

        // Global
        (_, Char('s'), _) => request = Some(NetworkRequest::StopTracking),
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}
