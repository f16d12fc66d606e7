//! One reconciliation pass: fetch each tracked league once, diff every tracked
//! game against its fresh candidate, push changes to the sink, then apply the
//! evictions collected along the way.
//!
//! The registry lock is only ever taken for synchronous reads and writes.
//! Every await (fetch, sink update) is a point where a command may have
//! re-tracked or cleared an entry, so membership is checked again with
//! [`TrackingRegistry::holds`](super::TrackingRegistry::holds) afterwards.
use super::registry::{ScoreSignature, SharedRegistry};
use super::sink::{PresentationHandle, PresentationSink, SinkError};
use crate::render::render_game;
use futures_util::future::join_all;
use log::{debug, error, info, warn};
use scoreboard_api::{Game, League, ScoreFeed};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// What a single pass did, for the status bar and the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub tracked: usize,
    pub leagues_fetched: usize,
    pub leagues_failed: Vec<League>,
    pub updated: usize,
    pub finalized: usize,
    pub target_gone: usize,
    /// Tracked but absent from this pass's feed.
    pub missing: usize,
    pub unchanged: usize,
    /// League fetch failed; retried next pass.
    pub skipped: usize,
    /// Untracked or re-tracked while the pass was suspended.
    pub dropped: usize,
    pub errors: usize,
}

impl PassReport {
    pub fn pushed(&self) -> usize {
        self.updated + self.finalized
    }

    pub fn evicted(&self) -> usize {
        self.finalized + self.target_gone
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Updated,
    Finalized,
    TargetGone,
    Missing,
    Unchanged,
    Dropped,
    Failed,
}

pub struct Reconciler<F, S> {
    feed: Arc<F>,
    sink: Arc<S>,
    registry: SharedRegistry,
}

impl<F: ScoreFeed, S: PresentationSink> Reconciler<F, S> {
    pub fn new(feed: Arc<F>, sink: Arc<S>, registry: SharedRegistry) -> Self {
        Self { feed, sink, registry }
    }

    pub async fn run_pass(&self) -> PassReport {
        let snapshot = {
            let registry = self.registry.lock().await;
            if registry.is_empty() {
                return PassReport::default();
            }
            registry.snapshot()
        };
        let mut report = PassReport { tracked: snapshot.len(), ..Default::default() };

        let leagues: BTreeSet<League> = snapshot.iter().map(|(_, entry)| entry.league).collect();
        let candidates = self.fetch_leagues(&leagues, &mut report).await;

        let mut evictions: Vec<(String, PresentationHandle)> = Vec::new();
        for (id, entry) in snapshot {
            let Some(games) = candidates.get(&entry.league) else {
                report.skipped += 1;
                continue;
            };

            match self.reconcile_entry(&id, entry.handle, games.get(&id)).await {
                Outcome::Updated => report.updated += 1,
                Outcome::Finalized => {
                    report.finalized += 1;
                    evictions.push((id, entry.handle));
                }
                Outcome::TargetGone => {
                    report.target_gone += 1;
                    evictions.push((id, entry.handle));
                }
                Outcome::Missing => report.missing += 1,
                Outcome::Unchanged => report.unchanged += 1,
                Outcome::Dropped => report.dropped += 1,
                Outcome::Failed => report.errors += 1,
            }
        }

        if !evictions.is_empty() {
            let mut registry = self.registry.lock().await;
            for (id, handle) in evictions {
                // A re-track during the pass installed a new handle; leave it be.
                if registry.holds(&id, handle) {
                    registry.untrack(&id);
                    debug!("stopped tracking game {id}");
                }
            }
        }

        info!(
            "tracking pass: {} tracked, {} pushed, {} evicted, {} skipped",
            report.tracked,
            report.pushed(),
            report.evicted(),
            report.skipped
        );
        debug!(
            "tracking pass detail: {}/{} leagues fetched, {} unchanged, {} missing, {} dropped, {} errors",
            report.leagues_fetched,
            report.leagues_fetched + report.leagues_failed.len(),
            report.unchanged,
            report.missing,
            report.dropped,
            report.errors
        );
        report
    }

    async fn fetch_leagues(
        &self,
        leagues: &BTreeSet<League>,
        report: &mut PassReport,
    ) -> HashMap<League, HashMap<String, Game>> {
        let fetches = leagues.iter().map(|&league| async move {
            (league, self.feed.fetch_games(league).await)
        });

        let mut candidates = HashMap::new();
        for (league, result) in join_all(fetches).await {
            match result {
                Ok(games) => {
                    report.leagues_fetched += 1;
                    let by_id = games.into_iter().map(|game| (game.id.clone(), game)).collect();
                    candidates.insert(league, by_id);
                }
                Err(e) => {
                    warn!("skipping tracked {league} games this pass: {e}");
                    report.leagues_failed.push(league);
                }
            }
        }
        candidates
    }

    async fn reconcile_entry(
        &self,
        id: &str,
        handle: PresentationHandle,
        candidate: Option<&Game>,
    ) -> Outcome {
        let Some(game) = candidate else {
            debug!("game {id} not in this pass's feed, keeping it");
            return Outcome::Missing;
        };

        // The fetch was a suspension point; read the entry as it is now.
        let stored = {
            let registry = self.registry.lock().await;
            match registry.get(id) {
                Some(current) if current.handle == handle => current.last_signature.clone(),
                _ => return Outcome::Dropped,
            }
        };

        let signature = ScoreSignature::of(game);
        let completed = game.status.completed;
        if !completed && stored.as_ref() == Some(&signature) {
            return Outcome::Unchanged;
        }

        match self.sink.update(handle, render_game(game)).await {
            Ok(()) if completed => {
                info!("{} game {id} final at {signature}", game.league);
                Outcome::Finalized
            }
            Ok(()) => {
                let mut registry = self.registry.lock().await;
                if !registry.holds(id, handle) {
                    return Outcome::Dropped;
                }
                registry.update_score_signature(id, signature);
                Outcome::Updated
            }
            Err(SinkError::TargetGone) => {
                info!("presentation {handle} for game {id} is gone, untracking");
                Outcome::TargetGone
            }
            Err(e) => {
                error!("failed to update {} game {id}: {e}", game.league);
                Outcome::Failed
            }
        }
    }
}
