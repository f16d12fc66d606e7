use crate::state::network::LoadingState;
use crate::tracking::{PassReport, PresentationHandle};
use crossterm::event::KeyEvent;
use scoreboard_api::{Game, League};

/// Commands the UI hands to the network worker. `None` means every enabled
/// league.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    LoadScores { league: Option<League> },
    TrackLeague { league: Option<League> },
    /// `number` is the 1-based position in the league's game list.
    TrackGame { league: League, number: usize },
    /// Take a card off the board and stop tracking its game.
    DismissCard { handle: PresentationHandle },
    StopTracking,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    ScoresLoaded { league: League, games: Vec<Game> },
    Notice { message: String },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    PassCompleted(PassReport),
}
