use crate::app::MenuItem;
use crate::state::board::Card;
use crate::tracking::{PassReport, PresentationHandle};
use chrono::{DateTime, Local};
use scoreboard_api::{Game, League};
use std::collections::{HashMap, HashSet, VecDeque};

const MAX_NOTICES: usize = 5;

// ---------------------------------------------------------------------------
// Scoreboard state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ScoreboardState {
    /// Enabled leagues, in tab order.
    pub leagues: Vec<League>,
    pub selected_league: usize,
    pub games: HashMap<League, Vec<Game>>,
    pub loaded_at: HashMap<League, DateTime<Local>>,
    /// Cursor into the selected league's game list.
    pub selected_game: usize,
}

impl ScoreboardState {
    pub fn new(leagues: Vec<League>) -> Self {
        Self { leagues, ..Self::default() }
    }

    pub fn current_league(&self) -> Option<League> {
        self.leagues.get(self.selected_league).copied()
    }

    pub fn current_games(&self) -> &[Game] {
        self.current_league()
            .and_then(|league| self.games.get(&league))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn store(&mut self, league: League, games: Vec<Game>) {
        self.games.insert(league, games);
        self.loaded_at.insert(league, Local::now());
        self.clamp_cursor();
    }

    pub fn next_league(&mut self) {
        if !self.leagues.is_empty() {
            self.selected_league = (self.selected_league + 1) % self.leagues.len();
            self.selected_game = 0;
        }
    }

    pub fn prev_league(&mut self) {
        if !self.leagues.is_empty() {
            self.selected_league =
                (self.selected_league + self.leagues.len() - 1) % self.leagues.len();
            self.selected_game = 0;
        }
    }

    pub fn game_down(&mut self) {
        let max = self.current_games().len().saturating_sub(1);
        if self.selected_game < max {
            self.selected_game += 1;
        }
    }

    pub fn game_up(&mut self) {
        self.selected_game = self.selected_game.saturating_sub(1);
    }

    /// League and 1-based game number under the cursor.
    pub fn selected_number(&self) -> Option<(League, usize)> {
        let league = self.current_league()?;
        (self.selected_game < self.current_games().len()).then_some((league, self.selected_game + 1))
    }

    fn clamp_cursor(&mut self) {
        let max = self.current_games().len().saturating_sub(1);
        self.selected_game = self.selected_game.min(max);
    }
}

// ---------------------------------------------------------------------------
// Tracked board state (a copy of the board's cards for drawing)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct BoardState {
    pub cards: Vec<Card>,
    pub selected: usize,
    /// Game ids the registry is tracking right now. Cards can outlive their
    /// tracking (a finished game keeps its final card).
    pub tracked: HashSet<String>,
}

impl BoardState {
    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.selected = self.selected.min(self.cards.len().saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.cards.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_handle(&self) -> Option<PresentationHandle> {
        self.cards.get(self.selected).map(|card| card.handle)
    }

    pub fn is_tracked(&self, game_id: &str) -> bool {
        self.tracked.contains(game_id)
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    /// Most recent first.
    pub notices: VecDeque<String>,
    pub last_pass: Option<(PassReport, DateTime<Local>)>,
    pub scoreboard: ScoreboardState,
    pub board: BoardState,
}

impl AppState {
    pub fn new(leagues: Vec<League>) -> Self {
        Self { scoreboard: ScoreboardState::new(leagues), ..Self::default() }
    }

    pub fn push_notice(&mut self, message: impl Into<String>) {
        self.notices.push_front(message.into());
        self.notices.truncate(MAX_NOTICES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::game;
    use crate::render::render_game;

    fn games(league: League, n: usize) -> Vec<Game> {
        (0..n).map(|i| game(&i.to_string(), league, "0", "0")).collect()
    }

    #[test]
    fn league_cycling_wraps_and_resets_cursor() {
        let mut s = ScoreboardState::new(vec![League::Nfl, League::Nba, League::Mlb]);
        s.store(League::Nfl, games(League::Nfl, 3));
        s.game_down();
        assert_eq!(s.selected_number(), Some((League::Nfl, 2)));

        s.prev_league();
        assert_eq!(s.current_league(), Some(League::Mlb));
        assert_eq!(s.selected_game, 0);
        s.next_league();
        assert_eq!(s.current_league(), Some(League::Nfl));
    }

    #[test]
    fn cursor_stays_inside_the_list() {
        let mut s = ScoreboardState::new(vec![League::Nhl]);
        s.store(League::Nhl, games(League::Nhl, 2));
        s.game_down();
        s.game_down();
        assert_eq!(s.selected_game, 1);

        s.store(League::Nhl, games(League::Nhl, 1));
        assert_eq!(s.selected_number(), Some((League::Nhl, 1)));

        s.store(League::Nhl, vec![]);
        assert_eq!(s.selected_number(), None);
    }

    #[test]
    fn board_selection_follows_removals() {
        let card = |n: u64| Card {
            handle: PresentationHandle::new(n),
            payload: render_game(&game(&n.to_string(), League::Nfl, "0", "0")),
            revision: 0,
            updated_at: Local::now(),
        };
        let mut board = BoardState::default();
        board.set_cards(vec![card(1), card(2), card(3)]);
        board.select_next();
        board.select_next();
        board.select_next();
        assert_eq!(board.selected_handle(), Some(PresentationHandle::new(3)));

        board.set_cards(vec![card(1)]);
        assert_eq!(board.selected_handle(), Some(PresentationHandle::new(1)));
    }

    #[test]
    fn tracked_games_come_from_the_registry_copy() {
        let mut board = BoardState::default();
        board.set_cards(vec![Card {
            handle: PresentationHandle::new(1),
            payload: render_game(&game("G1", League::Nfl, "0", "0")),
            revision: 0,
            updated_at: Local::now(),
        }]);
        assert!(!board.is_tracked("G1"));

        board.tracked = HashSet::from(["G1".to_string()]);
        assert!(board.is_tracked("G1"));
    }

    #[test]
    fn notices_are_capped() {
        let mut state = AppState::new(vec![]);
        for i in 0..8 {
            state.push_notice(format!("n{i}"));
        }
        assert_eq!(state.notices.len(), MAX_NOTICES);
        assert_eq!(state.notices.front().map(String::as_str), Some("n7"));
    }
}
