//! User-facing commands: list scores, start and stop tracking.
//!
//! Each command answers with the `NetworkResponse`s the UI should apply, in
//! order. Feed failures never escape as errors here; they become the generic
//! "could not fetch" message.
use crate::render::render_game;
use crate::state::messages::NetworkResponse;
use crate::tracking::{PresentationHandle, PresentationSink, ScoreSignature, SharedRegistry, SinkError};
use futures_util::future::join_all;
use log::{error, info, warn};
use scoreboard_api::{Game, League, ScoreFeed};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackRejection {
    #[error("Invalid game number. {league} has {count} game(s) today.")]
    InvalidNumber { league: String, count: usize },
    #[error("This game has already completed. Only active games can be tracked.")]
    Completed,
}

/// Pick the `number`th (1-based) game out of a league's list, refusing
/// out-of-range numbers and finished games.
pub fn select_game(games: &[Game], league: League, number: usize) -> Result<&Game, TrackRejection> {
    let game = number
        .checked_sub(1)
        .and_then(|idx| games.get(idx))
        .ok_or_else(|| TrackRejection::InvalidNumber {
            league: league.display_name().to_string(),
            count: games.len(),
        })?;
    if game.status.completed {
        return Err(TrackRejection::Completed);
    }
    Ok(game)
}

pub struct Commands<F, S> {
    feed: Arc<F>,
    sink: Arc<S>,
    registry: SharedRegistry,
    leagues: Vec<League>,
    poll_interval: Duration,
}

impl<F: ScoreFeed, S: PresentationSink> Commands<F, S> {
    pub fn new(
        feed: Arc<F>,
        sink: Arc<S>,
        registry: SharedRegistry,
        leagues: Vec<League>,
        poll_interval: Duration,
    ) -> Self {
        Self { feed, sink, registry, leagues, poll_interval }
    }

    pub async fn scores(&self, league: Option<League>) -> Vec<NetworkResponse> {
        let leagues = match self.targets(league) {
            Ok(leagues) => leagues,
            Err(rejected) => return vec![rejected],
        };

        let mut out = Vec::new();
        for (league, games) in self.fetch_all(&leagues).await {
            let Some(games) = games else {
                out.push(fetch_failed(league));
                continue;
            };
            if games.is_empty() {
                out.push(NetworkResponse::Notice {
                    message: format!("No {} games scheduled today.", league.display_name()),
                });
            }
            out.push(NetworkResponse::ScoresLoaded { league, games });
        }
        out
    }

    /// Publish and track every game that is not finished yet. A game that was
    /// already tracked gets a fresh card in place of its old one.
    pub async fn track_league(&self, league: Option<League>) -> Vec<NetworkResponse> {
        let leagues = match self.targets(league) {
            Ok(leagues) => leagues,
            Err(rejected) => return vec![rejected],
        };

        let mut out = Vec::new();
        let mut tracked = 0;
        for (league, games) in self.fetch_all(&leagues).await {
            let Some(games) = games else {
                out.push(fetch_failed(league));
                continue;
            };

            let active: Vec<&Game> = games.iter().filter(|g| !g.status.completed).collect();
            if active.is_empty() {
                out.push(NetworkResponse::Notice {
                    message: format!("No active {} games to track right now.", league.display_name()),
                });
            }
            for game in active {
                match self.publish_and_track(game).await {
                    Ok(()) => tracked += 1,
                    Err(response) => out.push(response),
                }
            }
            out.push(NetworkResponse::ScoresLoaded { league, games });
        }

        if tracked > 0 {
            out.push(NetworkResponse::Notice {
                message: format!(
                    "Now tracking {tracked} active game(s). Cards update every {}s.",
                    self.poll_interval.as_secs()
                ),
            });
        }
        out
    }

    pub async fn track_game(&self, league: League, number: usize) -> Vec<NetworkResponse> {
        if let Err(rejected) = self.targets(Some(league)) {
            return vec![rejected];
        }
        let games = match self.feed.fetch_games(league).await {
            Ok(games) => games,
            Err(_) => return vec![fetch_failed(league)],
        };

        let game = match select_game(&games, league, number) {
            Ok(game) => game,
            Err(rejection) => return vec![NetworkResponse::Error { message: rejection.to_string() }],
        };

        let title = format!("{} @ {}", game.away.abbreviation, game.home.abbreviation);
        if let Err(response) = self.publish_and_track(game).await {
            return vec![response];
        }

        vec![
            NetworkResponse::Notice {
                message: format!(
                    "Now tracking {title}. Card updates every {}s.",
                    self.poll_interval.as_secs()
                ),
            },
            NetworkResponse::ScoresLoaded { league, games },
        ]
    }

    /// Take one card down and stop tracking whatever game it showed.
    pub async fn dismiss(&self, handle: PresentationHandle) -> Vec<NetworkResponse> {
        let untracked = {
            let mut registry = self.registry.lock().await;
            let id = registry
                .entries()
                .iter()
                .find(|(_, entry)| entry.handle == handle)
                .map(|(id, _)| id.clone());
            id.and_then(|id| registry.untrack(&id).map(|_| id))
        };
        if let Some(id) = &untracked {
            info!("stopped tracking game {id}");
        }
        self.retire(handle).await;
        vec![NetworkResponse::Notice { message: format!("Card {handle} dismissed.") }]
    }

    /// Stop tracking everything and take the cards down with it.
    pub async fn stop_tracking(&self) -> Vec<NetworkResponse> {
        let entries = self.registry.lock().await.take_all();
        let count = entries.len();
        for (_, entry) in entries {
            self.retire(entry.handle).await;
        }
        info!("stopped tracking {count} game(s)");
        vec![NetworkResponse::Notice {
            message: format!("Stopped tracking {count} game(s). Press t to start tracking again."),
        }]
    }

    fn targets(&self, league: Option<League>) -> Result<Vec<League>, NetworkResponse> {
        match league {
            None => Ok(self.leagues.clone()),
            Some(league) if self.leagues.contains(&league) => Ok(vec![league]),
            Some(league) => Err(NetworkResponse::Error {
                message: format!("{} is not enabled.", league.display_name()),
            }),
        }
    }

    async fn fetch_all(&self, leagues: &[League]) -> Vec<(League, Option<Vec<Game>>)> {
        let fetches = leagues.iter().map(|&league| async move {
            (league, self.feed.fetch_games(league).await.ok())
        });
        join_all(fetches).await
    }

    /// The signature of what was just published is stored right away so the
    /// next pass does not push the same content again.
    async fn publish_and_track(&self, game: &Game) -> Result<(), NetworkResponse> {
        let handle = self.sink.publish(render_game(game)).await.map_err(|e| {
            error!("could not publish {} game {}: {e}", game.league, game.id);
            NetworkResponse::Error { message: format!("Could not show game {}.", game.id) }
        })?;

        let replaced = {
            let mut registry = self.registry.lock().await;
            let replaced = registry.track(game.id.clone(), handle, game.league);
            registry.update_score_signature(&game.id, ScoreSignature::of(game));
            replaced
        };
        info!("tracking {} game {} as {handle}", game.league, game.id);

        // The old card would never be updated again.
        if let Some(old) = replaced {
            self.retire(old.handle).await;
        }
        Ok(())
    }

    async fn retire(&self, handle: PresentationHandle) {
        match self.sink.retract(handle).await {
            Ok(()) | Err(SinkError::TargetGone) => {}
            Err(e) => warn!("could not take down {handle}: {e}"),
        }
    }
}

fn fetch_failed(league: League) -> NetworkResponse {
    NetworkResponse::Error {
        message: format!("Could not fetch {} scores at this time.", league.display_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::{finished, game};
    use crate::state::board::Board;
    use crate::tracking::TrackingRegistry;
    use crate::tracking::testing::{FakeFeed, RecordingSink};

    fn commands(feed: FakeFeed, leagues: &[League]) -> Commands<FakeFeed, RecordingSink> {
        Commands::new(
            Arc::new(feed),
            Arc::new(RecordingSink::default()),
            TrackingRegistry::new().shared(),
            leagues.to_vec(),
            Duration::from_secs(30),
        )
    }

    fn messages(responses: &[NetworkResponse]) -> Vec<String> {
        responses
            .iter()
            .filter_map(|r| match r {
                NetworkResponse::Notice { message } | NetworkResponse::Error { message } => {
                    Some(message.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn select_game_is_one_based() {
        let games = vec![game("a", League::Nfl, "0", "0"), game("b", League::Nfl, "0", "0")];
        assert_eq!(select_game(&games, League::Nfl, 2).unwrap().id, "b");
        assert!(matches!(
            select_game(&games, League::Nfl, 0),
            Err(TrackRejection::InvalidNumber { count: 2, .. })
        ));
        assert!(matches!(
            select_game(&games, League::Nfl, 3),
            Err(TrackRejection::InvalidNumber { .. })
        ));
    }

    #[test]
    fn select_game_refuses_finished_games() {
        let games = vec![finished(game("a", League::Nba, "100", "90"))];
        assert_eq!(select_game(&games, League::Nba, 1), Err(TrackRejection::Completed));
    }

    #[tokio::test]
    async fn scores_report_failed_and_empty_leagues() {
        let feed = FakeFeed::default().with(League::Nhl, vec![]);
        let c = commands(feed, &[League::Nhl, League::Mlb]);

        let responses = c.scores(None).await;
        assert_eq!(
            messages(&responses),
            vec![
                "No NHL games scheduled today.".to_string(),
                "Could not fetch MLB scores at this time.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn disabled_league_is_rejected_without_fetching() {
        let c = commands(FakeFeed::default(), &[League::Nfl]);
        let responses = c.scores(Some(League::Mlb)).await;
        assert_eq!(messages(&responses), vec!["MLB is not enabled.".to_string()]);
        assert!(c.feed.calls().is_empty());
    }

    fn commands_on(feed: FakeFeed, board: &Board, leagues: &[League]) -> Commands<FakeFeed, Board> {
        Commands::new(
            Arc::new(feed),
            Arc::new(board.clone()),
            TrackingRegistry::new().shared(),
            leagues.to_vec(),
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn track_league_skips_finished_games_and_replaces_tracked_ones() {
        let feed = FakeFeed::default().with(
            League::Nfl,
            vec![
                game("live", League::Nfl, "7", "3"),
                game("soon", League::Nfl, "0", "0"),
                finished(game("done", League::Nfl, "21", "14")),
            ],
        );
        let c = commands(feed, &[League::Nfl]);

        c.track_league(Some(League::Nfl)).await;
        assert_eq!(c.sink.publish_count(), 2);
        {
            let registry = c.registry.lock().await;
            assert_eq!(registry.len(), 2);
            assert!(!registry.contains("done"));
            assert_eq!(
                registry.get("live").unwrap().last_signature,
                Some(ScoreSignature::from_scores("7", "3"))
            );
        }

        // A second run swaps in fresh cards and takes the first two down.
        c.track_league(Some(League::Nfl)).await;
        assert_eq!(c.sink.publish_count(), 4);
        assert_eq!(c.sink.retracted.lock().unwrap().len(), 2);
        assert_eq!(c.registry.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn track_league_with_nothing_active() {
        let feed = FakeFeed::default().with(League::Nba, vec![finished(game("x", League::Nba, "1", "2"))]);
        let c = commands(feed, &[League::Nba]);
        let responses = c.track_league(None).await;
        assert_eq!(
            messages(&responses),
            vec!["No active NBA games to track right now.".to_string()]
        );
        assert!(c.registry.lock().await.is_empty());
    }

    #[tokio::test]
    async fn track_game_rejects_bad_numbers_and_finished_games() {
        let feed = FakeFeed::default().with(
            League::Mlb,
            vec![finished(game("a", League::Mlb, "5", "4")), game("b", League::Mlb, "0", "1")],
        );
        let c = commands(feed, &[League::Mlb]);

        let responses = c.track_game(League::Mlb, 1).await;
        assert_eq!(
            messages(&responses),
            vec!["This game has already completed. Only active games can be tracked.".to_string()]
        );
        let responses = c.track_game(League::Mlb, 9).await;
        assert!(messages(&responses)[0].starts_with("Invalid game number"));

        let responses = c.track_game(League::Mlb, 2).await;
        assert_eq!(messages(&responses)[0], "Now tracking AWY @ HOM. Card updates every 30s.");
        assert!(c.registry.lock().await.contains("b"));
    }

    #[tokio::test]
    async fn stop_tracking_clears_everything() {
        let feed = FakeFeed::default().with(
            League::Nhl,
            vec![game("1", League::Nhl, "0", "0"), game("2", League::Nhl, "0", "0"), game("3", League::Nhl, "1", "0")],
        );
        let c = commands(feed, &[League::Nhl]);
        c.track_league(None).await;

        let responses = c.stop_tracking().await;
        assert_eq!(
            messages(&responses),
            vec!["Stopped tracking 3 game(s). Press t to start tracking again.".to_string()]
        );
        assert!(c.registry.lock().await.is_empty());
        assert_eq!(c.sink.retracted.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn dismissed_game_can_be_tracked_again() {
        let board = Board::default();
        let feed = FakeFeed::default().with(League::Nfl, vec![game("G1", League::Nfl, "7", "0")]);
        let c = commands_on(feed, &board, &[League::Nfl]);

        c.track_game(League::Nfl, 1).await;
        let first = board.cards().await[0].handle;
        c.dismiss(first).await;
        assert!(board.cards().await.is_empty());
        assert!(c.registry.lock().await.is_empty());

        let responses = c.track_game(League::Nfl, 1).await;
        assert_eq!(messages(&responses), vec!["Now tracking AWY @ HOM. Card updates every 30s.".to_string()]);
        let cards = board.cards().await;
        assert_eq!(cards.len(), 1);
        assert_ne!(cards[0].handle, first);
        assert!(c.registry.lock().await.holds("G1", cards[0].handle));
    }

    #[tokio::test]
    async fn card_removed_outside_the_commands_can_be_tracked_again() {
        let board = Board::default();
        let feed = FakeFeed::default().with(League::Nba, vec![game("G2", League::Nba, "50", "48")]);
        let c = commands_on(feed, &board, &[League::Nba]);

        c.track_game(League::Nba, 1).await;
        let first = board.cards().await[0].handle;
        board.dismiss(first).await;

        c.track_game(League::Nba, 1).await;
        let cards = board.cards().await;
        assert_eq!(cards.len(), 1);
        assert!(c.registry.lock().await.holds("G2", cards[0].handle));
    }

    #[tokio::test]
    async fn stop_then_track_leaves_one_card_per_game() {
        let board = Board::default();
        let feed = FakeFeed::default().with(
            League::Nhl,
            vec![game("1", League::Nhl, "0", "0"), game("2", League::Nhl, "2", "1")],
        );
        let c = commands_on(feed, &board, &[League::Nhl]);

        c.track_league(None).await;
        c.stop_tracking().await;
        assert!(board.cards().await.is_empty());

        c.track_league(None).await;
        let cards = board.cards().await;
        let mut ids: Vec<&str> = cards.iter().map(|card| card.payload.game_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2"]);
        let registry = c.registry.lock().await;
        assert!(cards.iter().all(|card| registry.holds(&card.payload.game_id, card.handle)));
    }
}
