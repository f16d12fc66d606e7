pub mod client;
pub mod espn;
pub mod league;
pub mod normalize;

pub use client::{ESPN_SITE_V2, FeedEndpoints, FeedError, FeedResult, ScoreFeed, ScoreboardApi};
pub use league::{League, LeagueFamily, UnsupportedLeague};
pub use normalize::normalize;

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Domain types, independent of the ESPN wire format
// ---------------------------------------------------------------------------

/// One contest as seen in a single scoreboard fetch.
///
/// Games are rebuilt from scratch on every poll and never mutated; compare a
/// fresh value against whatever state you kept instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: String,
    pub league: League,
    pub name: String,       // "Kansas City Chiefs at Buffalo Bills"
    pub short_name: String, // "KC @ BUF"
    pub home: TeamLine,
    pub away: TeamLine,
    pub status: GameStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub broadcast: Option<String>,
    pub attendance: Option<u32>,
    pub odds: Option<Odds>,
    pub situation: Option<Situation>,
}

impl Game {
    pub fn phase(&self) -> GamePhase {
        self.status.phase()
    }

    pub fn is_live(&self) -> bool {
        self.phase() == GamePhase::Live
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamLine {
    pub id: String,
    pub name: String,         // "Buffalo Bills"
    pub abbreviation: String, // "BUF", or "BUF" derived from the name when ESPN omits it
    pub color: u32,           // already resolved to the league default when missing
    pub logo: Option<String>,
    pub score: String,
    pub record: Option<String>, // "11-3"
    pub line_scores: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameStatus {
    pub description: String, // "In Progress"
    pub detail: String,      // "7:42 - 3rd Quarter"
    pub completed: bool,
    pub period: u32, // 0 until the game starts
    pub clock: String,
}

impl GameStatus {
    pub fn phase(&self) -> GamePhase {
        if self.completed {
            GamePhase::Final
        } else if self.period > 0 {
            GamePhase::Live
        } else {
            GamePhase::Scheduled
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GamePhase {
    #[default]
    Scheduled,
    Live,
    Final,
}

impl GamePhase {
    pub fn label(self) -> &'static str {
        match self {
            GamePhase::Scheduled => "Scheduled",
            GamePhase::Live => "Live",
            GamePhase::Final => "Final",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Odds {
    pub details: Option<String>,    // "BUF -3.5"
    pub over_under: Option<String>, // "47.5"
}

/// League-specific live state. Only the football and baseball families carry one.
#[derive(Debug, Clone, PartialEq)]
pub enum Situation {
    Football(FootballSituation),
    Baseball(BaseballSituation),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FootballSituation {
    pub possession: Option<Possession>,
    pub down_distance: Option<String>,  // "2nd & 7 at KC 35"
    pub field_position: Option<String>, // "KC 35"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Possession {
    Home,
    Away,
    /// The feed named a team that is neither side of this game.
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseballSituation {
    pub batter: Option<String>,
    pub balls: Option<u8>,
    pub strikes: Option<u8>,
    pub outs: Option<u8>,
    pub on_first: bool,
    pub on_second: bool,
    pub on_third: bool,
}

impl BaseballSituation {
    pub fn occupied_bases(&self) -> Vec<&'static str> {
        [(self.on_first, "1st"), (self.on_second, "2nd"), (self.on_third, "3rd")]
            .into_iter()
            .filter_map(|(occupied, base)| occupied.then_some(base))
            .collect()
    }
}
