use crate::tracking::sink::PresentationHandle;
use scoreboard_api::{Game, League};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Registry handle shared by the command layer and the reconciler. Never hold
/// the lock across an await.
pub type SharedRegistry = Arc<Mutex<TrackingRegistry>>;

/// Cheap change detector: "{away}-{home}" exactly as the feed reports them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreSignature(String);

impl ScoreSignature {
    pub fn of(game: &Game) -> Self {
        Self::from_scores(&game.away.score, &game.home.score)
    }

    pub fn from_scores(away: &str, home: &str) -> Self {
        Self(format!("{away}-{home}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScoreSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEntry {
    pub handle: PresentationHandle,
    pub league: League,
    /// `None` until the first update after tracking.
    pub last_signature: Option<ScoreSignature>,
}

/// Game id → tracked state. At most one entry per game id.
#[derive(Debug, Default)]
pub struct TrackingRegistry {
    entries: HashMap<String, TrackedEntry>,
}

impl TrackingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedRegistry {
        Arc::new(Mutex::new(self))
    }

    /// Insert or replace. Re-tracking swaps the handle and forgets the stored
    /// signature. Returns the replaced entry, if any.
    pub fn track(
        &mut self,
        id: impl Into<String>,
        handle: PresentationHandle,
        league: League,
    ) -> Option<TrackedEntry> {
        self.entries.insert(
            id.into(),
            TrackedEntry { handle, league, last_signature: None },
        )
    }

    pub fn untrack(&mut self, id: &str) -> Option<TrackedEntry> {
        self.entries.remove(id)
    }

    pub fn entries(&self) -> &HashMap<String, TrackedEntry> {
        &self.entries
    }

    /// Owned copy for iterating while the registry keeps changing underneath.
    pub fn snapshot(&self) -> Vec<(String, TrackedEntry)> {
        self.entries()
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&TrackedEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// True if `id` is still tracked through the same `handle`. Used to
    /// re-validate an entry after an await.
    pub fn holds(&self, id: &str, handle: PresentationHandle) -> bool {
        self.entries.get(id).is_some_and(|e| e.handle == handle)
    }

    pub fn update_score_signature(&mut self, id: &str, signature: ScoreSignature) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.last_signature = Some(signature);
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) -> usize {
        self.take_all().len()
    }

    /// Empty the registry, handing back what was in it.
    pub fn take_all(&mut self) -> Vec<(String, TrackedEntry)> {
        self.entries.drain().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
