use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::board::Card;
use crate::tracking::PassReport;
use chrono::Local;
use log::warn;
use scoreboard_api::{Game, League};
use std::collections::HashSet;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Scoreboard,
    Tracked,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self { state: AppState::new(settings.leagues.clone()), settings };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network and tracking updates, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_scores_loaded(&mut self, league: League, games: Vec<Game>) {
        self.state.last_error = None;
        self.state.scoreboard.store(league, games);
    }

    pub fn on_notice(&mut self, message: String) {
        self.state.push_notice(message);
    }

    pub fn on_error(&mut self, message: String) {
        warn!("{message}");
        self.state.push_notice(message.clone());
        self.state.last_error = Some(message);
    }

    pub fn on_board_changed(&mut self, cards: Vec<Card>) {
        self.state.board.set_cards(cards);
    }

    pub fn on_tracking_changed(&mut self, tracked: HashSet<String>) {
        self.state.board.tracked = tracked;
    }

    pub fn on_pass_completed(&mut self, report: PassReport) {
        if !report.leagues_failed.is_empty() {
            let failed: Vec<&str> = report.leagues_failed.iter().map(|l| l.display_name()).collect();
            self.state.last_error = Some(format!("Could not fetch {} scores at this time.", failed.join(", ")));
        }
        self.state.last_pass = Some((report, Local::now()));
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}
