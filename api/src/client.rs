use crate::espn::ScoreboardResponse;
use crate::{Game, League, normalize};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub type FeedResult<T> = Result<T, FeedError>;

pub const ESPN_SITE_V2: &str = "https://site.api.espn.com/apis/site/v2/sports";

/// Everything that can go wrong fetching one league's scoreboard. Callers treat
/// all variants the same way: no data for that league this time around.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("no feed endpoint configured for {0}")]
    Unsupported(League),
    #[error("network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },
    #[error("API error for {url}: HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("parse error for {url}: {source}")]
    Parsing { url: String, source: reqwest::Error },
}

/// Scoreboard URL per enabled league. A league missing from the map is not
/// fetchable.
#[derive(Debug, Clone, Default)]
pub struct FeedEndpoints {
    urls: HashMap<League, String>,
}

impl FeedEndpoints {
    pub fn espn(leagues: &[League]) -> Self {
        Self::with_base(ESPN_SITE_V2, leagues)
    }

    pub fn with_base(base: &str, leagues: &[League]) -> Self {
        let base = base.trim_end_matches('/');
        let urls = leagues
            .iter()
            .map(|league| (*league, format!("{base}/{}", league.feed_path())))
            .collect();
        Self { urls }
    }

    /// Replace the URL for a league that is already enabled. Overrides for
    /// disabled leagues are ignored so the enabled set stays authoritative.
    pub fn set_override(&mut self, league: League, url: impl Into<String>) -> bool {
        match self.urls.get_mut(&league) {
            Some(existing) => {
                *existing = url.into();
                true
            }
            None => false,
        }
    }

    pub fn url_for(&self, league: League) -> Option<&str> {
        self.urls.get(&league).map(String::as_str)
    }

    pub fn leagues(&self) -> Vec<League> {
        let mut leagues: Vec<League> = self.urls.keys().copied().collect();
        leagues.sort();
        leagues
    }
}

/// Source of raw scoreboards, one league at a time.
#[async_trait]
pub trait ScoreFeed: Send + Sync {
    async fn fetch(&self, league: League) -> FeedResult<ScoreboardResponse>;

    /// Fetch and normalize in one go.
    async fn fetch_games(&self, league: League) -> FeedResult<Vec<Game>> {
        let raw = self.fetch(league).await?;
        Ok(normalize(&raw, league))
    }
}

/// Scoreboard client backed by ESPN's public site API.
#[derive(Debug, Clone)]
pub struct ScoreboardApi {
    client: Client,
    timeout: Duration,
    endpoints: FeedEndpoints,
}

impl Default for ScoreboardApi {
    fn default() -> Self {
        Self::new(FeedEndpoints::espn(&League::ALL))
    }
}

impl ScoreboardApi {
    pub fn new(endpoints: FeedEndpoints) -> Self {
        Self {
            client: Client::builder()
                .user_agent("scoretrack/0.1 (terminal score tracker)")
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(10),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &FeedEndpoints {
        &self.endpoints
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> FeedResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| FeedError::Network { url: url.to_owned(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status { url: url.to_owned(), status });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| FeedError::Parsing { url: url.to_owned(), source })
    }
}

#[async_trait]
impl ScoreFeed for ScoreboardApi {
    async fn fetch(&self, league: League) -> FeedResult<ScoreboardResponse> {
        let Some(url) = self.endpoints.url_for(league) else {
            warn!("refusing to fetch {league}: league is not enabled");
            return Err(FeedError::Unsupported(league));
        };

        debug!("fetching {league} scoreboard from {url}");
        self.get(url)
            .await
            .inspect_err(|e| warn!("{league} scoreboard fetch failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_GAME: &str = r#"{
        "events": [{
            "id": "401",
            "competitions": [{
                "status": { "period": 0, "type": { "description": "Scheduled", "detail": "Sun 1:00 PM", "completed": false } },
                "competitors": [
                    { "homeAway": "home", "score": "0", "team": { "id": "2", "displayName": "Buffalo Bills", "abbreviation": "BUF" } },
                    { "homeAway": "away", "score": "0", "team": { "id": "12", "displayName": "Kansas City Chiefs", "abbreviation": "KC" } }
                ]
            }]
        }]
    }"#;

    fn api_for(server: &mockito::Server, leagues: &[League]) -> ScoreboardApi {
        ScoreboardApi::new(FeedEndpoints::with_base(&server.url(), leagues))
    }

    #[test]
    fn endpoints_follow_league_paths() {
        let endpoints = FeedEndpoints::with_base("http://feed.local/sports/", &[League::Nhl]);
        assert_eq!(
            endpoints.url_for(League::Nhl),
            Some("http://feed.local/sports/hockey/nhl/scoreboard")
        );
        assert_eq!(endpoints.url_for(League::Nfl), None);
    }

    #[test]
    fn overrides_only_apply_to_enabled_leagues() {
        let mut endpoints = FeedEndpoints::espn(&[League::Mlb]);
        assert!(endpoints.set_override(League::Mlb, "http://mirror/mlb"));
        assert!(!endpoints.set_override(League::Nba, "http://mirror/nba"));
        assert_eq!(endpoints.url_for(League::Mlb), Some("http://mirror/mlb"));
        assert_eq!(endpoints.leagues(), vec![League::Mlb]);
    }

    #[tokio::test]
    async fn fetches_and_normalizes_a_scoreboard() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/football/nfl/scoreboard")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ONE_GAME)
            .create_async()
            .await;

        let games = api_for(&server, &[League::Nfl])
            .fetch_games(League::Nfl)
            .await
            .expect("fetch should succeed");

        mock.assert_async().await;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].away.abbreviation, "KC");
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/baseball/mlb/scoreboard")
            .with_status(503)
            .create_async()
            .await;

        let err = api_for(&server, &[League::Mlb])
            .fetch(League::Mlb)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn not_found_is_a_fetch_failure_too() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/hockey/nhl/scoreboard")
            .with_status(404)
            .create_async()
            .await;

        let err = api_for(&server, &[League::Nhl])
            .fetch(League::Nhl)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Status { .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/basketball/nba/scoreboard")
            .with_status(200)
            .with_body("<html>upstream hiccup</html>")
            .create_async()
            .await;

        let err = api_for(&server, &[League::Nba])
            .fetch(League::Nba)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Parsing { .. }));
    }

    #[tokio::test]
    async fn empty_document_is_an_empty_scoreboard() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/basketball/nba/scoreboard")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let games = api_for(&server, &[League::Nba])
            .fetch_games(League::Nba)
            .await
            .expect("empty document is valid");
        assert!(games.is_empty());
    }

    #[tokio::test]
    async fn disabled_league_never_hits_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = api_for(&server, &[League::Nfl])
            .fetch(League::Mlb)
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, FeedError::Unsupported(League::Mlb)));
    }
}
