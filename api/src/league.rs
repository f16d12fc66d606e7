//! Supported leagues and everything that differs between them.
//!
//! League-specific knowledge (feed path, display name, default color, period
//! naming, line-score columns) lives here and nowhere else. Callers pick a
//! [`League`] once and ask it; the per-family rules sit behind
//! [`LeagueFamily`].
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum League {
    Nfl,
    Nba,
    Nhl,
    Mlb,
}

/// Groups of leagues that share period and live-situation conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeagueFamily {
    /// Four quarters, numbered overtimes, possession/down-distance situation.
    Football,
    /// Four quarters, numbered overtimes, no situation block.
    Basketball,
    /// Three periods, then a single OT designation (and a shootout column).
    Hockey,
    /// Innings, count/baserunner situation.
    Baseball,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported league: {0:?} (expected one of nfl, nba, nhl, mlb)")]
pub struct UnsupportedLeague(pub String);

struct LeagueProfile {
    code: &'static str,
    name: &'static str,
    color: u32,
    feed_path: &'static str,
    family: LeagueFamily,
}

const NFL: LeagueProfile = LeagueProfile {
    code: "nfl",
    name: "NFL",
    color: 0x013369,
    feed_path: "football/nfl/scoreboard",
    family: LeagueFamily::Football,
};

const NBA: LeagueProfile = LeagueProfile {
    code: "nba",
    name: "NBA",
    color: 0x1D428A,
    feed_path: "basketball/nba/scoreboard",
    family: LeagueFamily::Basketball,
};

const NHL: LeagueProfile = LeagueProfile {
    code: "nhl",
    name: "NHL",
    color: 0x000000,
    feed_path: "hockey/nhl/scoreboard",
    family: LeagueFamily::Hockey,
};

const MLB: LeagueProfile = LeagueProfile {
    code: "mlb",
    name: "MLB",
    color: 0x041E42,
    feed_path: "baseball/mlb/scoreboard",
    family: LeagueFamily::Baseball,
};

const QUARTER_COLUMNS: &[&str] = &["Q1", "Q2", "Q3", "Q4", "OT1", "OT2", "OT3", "OT4", "OT5"];
const HOCKEY_COLUMNS: &[&str] = &["P1", "P2", "P3", "OT", "SO"];
const INNING_COLUMNS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19",
];

impl League {
    pub const ALL: [League; 4] = [League::Nfl, League::Nba, League::Nhl, League::Mlb];

    fn profile(self) -> &'static LeagueProfile {
        match self {
            League::Nfl => &NFL,
            League::Nba => &NBA,
            League::Nhl => &NHL,
            League::Mlb => &MLB,
        }
    }

    /// Lowercase code used in commands and config ("nfl").
    pub fn code(self) -> &'static str {
        self.profile().code
    }

    /// Uppercase name used in titles and footers ("NFL").
    pub fn display_name(self) -> &'static str {
        self.profile().name
    }

    /// Fallback card color when a team color is missing or unparseable.
    pub fn default_color(self) -> u32 {
        self.profile().color
    }

    /// Path under the ESPN site API sports root.
    pub fn feed_path(self) -> &'static str {
        self.profile().feed_path
    }

    pub fn family(self) -> LeagueFamily {
        self.profile().family
    }

    pub fn period_name(self, period: u32) -> String {
        self.family().period_name(period)
    }

    /// Pair each provided line score with its column label. Entries past the
    /// end of the label list are dropped.
    pub fn line_score_columns<'a>(self, values: &'a [String]) -> Vec<(&'static str, &'a str)> {
        self.family()
            .line_score_labels()
            .iter()
            .copied()
            .zip(values.iter().map(String::as_str))
            .collect()
    }
}

impl LeagueFamily {
    pub fn period_name(self, period: u32) -> String {
        match self {
            LeagueFamily::Football | LeagueFamily::Basketball => {
                if period <= 4 {
                    format!("Q{period}")
                } else {
                    format!("OT{}", period - 4)
                }
            }
            LeagueFamily::Hockey => {
                if period <= 3 {
                    format!("Period {period}")
                } else {
                    "OT".to_string()
                }
            }
            LeagueFamily::Baseball => format!("Inning {period}"),
        }
    }

    pub fn line_score_labels(self) -> &'static [&'static str] {
        match self {
            LeagueFamily::Football | LeagueFamily::Basketball => QUARTER_COLUMNS,
            LeagueFamily::Hockey => HOCKEY_COLUMNS,
            LeagueFamily::Baseball => INNING_COLUMNS,
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for League {
    type Err = UnsupportedLeague;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        League::ALL
            .into_iter()
            .find(|league| league.code() == code)
            .ok_or_else(|| UnsupportedLeague(s.to_string()))
    }
}
