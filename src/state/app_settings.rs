use anyhow::{Context, bail};
use log::LevelFilter;
use scoreboard_api::{FeedEndpoints, League, ESPN_SITE_V2};
use std::time::Duration;

pub const DEFAULT_POLL_SECS: u64 = 30;

/// Startup configuration. Read once; nothing here changes while running.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub poll_interval: Duration,
    pub leagues: Vec<League>,
    pub endpoints: FeedEndpoints,
    pub log_level: Option<LevelFilter>,
    pub full_screen: bool,
}

impl AppSettings {
    /// Environment, after pulling in a `.env` file if there is one.
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let poll_secs = match get("SCORETRACK_POLL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("SCORETRACK_POLL_SECS must be a whole number of seconds, got {raw:?}"))?,
            None => DEFAULT_POLL_SECS,
        };
        if poll_secs == 0 {
            bail!("SCORETRACK_POLL_SECS must be at least 1");
        }

        let leagues = match get("SCORETRACK_LEAGUES") {
            Some(raw) => parse_leagues(&raw)?,
            None => League::ALL.to_vec(),
        };

        let base = get("SCORETRACK_FEED_BASE").unwrap_or_else(|| ESPN_SITE_V2.to_string());
        let mut endpoints = FeedEndpoints::with_base(&base, &leagues);
        for league in &leagues {
            let key = format!("SCORETRACK_FEED_URL_{}", league.display_name());
            if let Some(url) = get(&key) {
                endpoints.set_override(*league, url);
            }
        }

        let log_level = match get("SCORETRACK_LOG") {
            Some(raw) => Some(
                raw.parse::<LevelFilter>()
                    .with_context(|| format!("SCORETRACK_LOG: unknown level {raw:?}"))?,
            ),
            None => None,
        };

        Ok(Self {
            poll_interval: Duration::from_secs(poll_secs),
            leagues,
            endpoints,
            log_level,
            full_screen: false,
        })
    }
}

/// Comma-separated league codes, deduplicated, in the order given.
fn parse_leagues(raw: &str) -> anyhow::Result<Vec<League>> {
    let mut leagues = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let league: League = code.parse().context("SCORETRACK_LEAGUES")?;
        if !leagues.contains(&league) {
            leagues.push(league);
        }
    }
    if leagues.is_empty() {
        bail!("SCORETRACK_LEAGUES names no leagues");
    }
    Ok(leagues)
}
