pub mod reconciler;
pub mod registry;
pub mod sink;

pub use reconciler::{PassReport, Reconciler};
pub use registry::{ScoreSignature, SharedRegistry, TrackedEntry, TrackingRegistry};
pub use sink::{PresentationHandle, PresentationSink, SinkError};

/// In-memory feed and sink doubles shared by the tracking and command tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::{PresentationHandle, PresentationSink, SharedRegistry, SinkError};
    use crate::render::PresentationPayload;
    use async_trait::async_trait;
    use scoreboard_api::espn::ScoreboardResponse;
    use scoreboard_api::{FeedError, FeedResult, Game, League, ScoreFeed};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Serves canned games per league. A league with no entry fails to fetch.
    #[derive(Default)]
    pub struct FakeFeed {
        games: Mutex<HashMap<League, Vec<Game>>>,
        calls: Mutex<Vec<League>>,
        clear_on_fetch: Option<SharedRegistry>,
    }

    impl FakeFeed {
        pub fn with(mut self, league: League, games: Vec<Game>) -> Self {
            self.games.get_mut().unwrap().insert(league, games);
            self
        }

        /// Simulate a stop-tracking command landing while the fetch is in flight.
        pub fn clearing(mut self, registry: SharedRegistry) -> Self {
            self.clear_on_fetch = Some(registry);
            self
        }

        pub fn set(&self, league: League, games: Vec<Game>) {
            self.games.lock().unwrap().insert(league, games);
        }

        pub fn calls(&self) -> Vec<League> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScoreFeed for FakeFeed {
        async fn fetch(&self, league: League) -> FeedResult<ScoreboardResponse> {
            Err(FeedError::Unsupported(league))
        }

        async fn fetch_games(&self, league: League) -> FeedResult<Vec<Game>> {
            self.calls.lock().unwrap().push(league);
            if let Some(registry) = &self.clear_on_fetch {
                registry.lock().await.clear_all();
            }
            self.games
                .lock()
                .unwrap()
                .get(&league)
                .cloned()
                .ok_or(FeedError::Unsupported(league))
        }
    }

    /// Records every publish, update and retract; handles in `gone` answer
    /// `TargetGone`.
    #[derive(Default)]
    pub struct RecordingSink {
        pub published: Mutex<Vec<PresentationPayload>>,
        pub updates: Mutex<Vec<(PresentationHandle, PresentationPayload)>>,
        pub retracted: Mutex<Vec<PresentationHandle>>,
        gone: Mutex<HashSet<PresentationHandle>>,
        clear_on_update: Option<SharedRegistry>,
    }

    impl RecordingSink {
        pub fn clearing(mut self, registry: SharedRegistry) -> Self {
            self.clear_on_update = Some(registry);
            self
        }

        pub fn remove(&self, handle: PresentationHandle) {
            self.gone.lock().unwrap().insert(handle);
        }

        pub fn update_count(&self) -> usize {
            self.updates.lock().unwrap().len()
        }

        pub fn publish_count(&self) -> usize {
            self.published.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PresentationSink for RecordingSink {
        async fn publish(&self, payload: PresentationPayload) -> Result<PresentationHandle, SinkError> {
            let mut published = self.published.lock().unwrap();
            published.push(payload);
            Ok(PresentationHandle::new(1000 + published.len() as u64))
        }

        async fn update(
            &self,
            handle: PresentationHandle,
            payload: PresentationPayload,
        ) -> Result<(), SinkError> {
            if let Some(registry) = &self.clear_on_update {
                registry.lock().await.clear_all();
            }
            if self.gone.lock().unwrap().contains(&handle) {
                return Err(SinkError::TargetGone);
            }
            self.updates.lock().unwrap().push((handle, payload));
            Ok(())
        }

        async fn retract(&self, handle: PresentationHandle) -> Result<(), SinkError> {
            if !self.gone.lock().unwrap().insert(handle) {
                return Err(SinkError::TargetGone);
            }
            self.retracted.lock().unwrap().push(handle);
            Ok(())
        }
    }
}
