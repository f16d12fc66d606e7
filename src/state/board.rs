//! The terminal's presentation sink: a board of cards, one per published game.
//!
//! Cards live here rather than in `AppState` so the reconciler can publish and
//! update them without touching the UI lock. The UI waits on
//! [`Board::changed`] and pulls a fresh copy with [`Board::cards`].
use crate::render::PresentationPayload;
use crate::tracking::{PresentationHandle, PresentationSink, SinkError};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub handle: PresentationHandle,
    pub payload: PresentationPayload,
    /// Bumped on every update; 0 right after publishing.
    pub revision: u32,
    pub updated_at: DateTime<Local>,
}

#[derive(Debug, Default)]
struct BoardInner {
    next_handle: u64,
    cards: BTreeMap<PresentationHandle, Card>,
}

#[derive(Debug, Clone, Default)]
pub struct Board {
    inner: Arc<Mutex<BoardInner>>,
    changed: Arc<Notify>,
}

impl Board {
    /// Cards in publish order.
    pub async fn cards(&self) -> Vec<Card> {
        self.inner.lock().await.cards.values().cloned().collect()
    }

    /// Resolves once the board has changed since the last call. Changes made
    /// while nobody is waiting collapse into one wakeup and are never lost.
    pub async fn changed(&self) {
        self.changed.notified().await;
    }

    /// Remove a card. Whoever tracks its game finds out through `TargetGone`.
    pub async fn dismiss(&self, handle: PresentationHandle) -> bool {
        let removed = self.inner.lock().await.cards.remove(&handle).is_some();
        if removed {
            debug!("card {handle} dismissed");
            self.changed.notify_one();
        }
        removed
    }
}

#[async_trait]
impl PresentationSink for Board {
    async fn publish(&self, payload: PresentationPayload) -> Result<PresentationHandle, SinkError> {
        let handle = {
            let mut inner = self.inner.lock().await;
            inner.next_handle += 1;
            let handle = PresentationHandle::new(inner.next_handle);
            debug!("publishing {} as card {handle}", payload.title);
            inner.cards.insert(
                handle,
                Card { handle, payload, revision: 0, updated_at: Local::now() },
            );
            handle
        };
        self.changed.notify_one();
        Ok(handle)
    }

    async fn update(
        &self,
        handle: PresentationHandle,
        payload: PresentationPayload,
    ) -> Result<(), SinkError> {
        {
            let mut inner = self.inner.lock().await;
            let card = inner.cards.get_mut(&handle).ok_or(SinkError::TargetGone)?;
            card.payload = payload;
            card.revision += 1;
            card.updated_at = Local::now();
        }
        self.changed.notify_one();
        Ok(())
    }

    async fn retract(&self, handle: PresentationHandle) -> Result<(), SinkError> {
        if self.dismiss(handle).await { Ok(()) } else { Err(SinkError::TargetGone) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::game;
    use crate::render::render_game;
    use futures_util::FutureExt;
    use scoreboard_api::League;

    #[tokio::test]
    async fn publish_hands_out_distinct_handles() {
        let board = Board::default();
        let a = board.publish(render_game(&game("1", League::Nfl, "0", "0"))).await.unwrap();
        let b = board.publish(render_game(&game("2", League::Nfl, "0", "0"))).await.unwrap();
        assert_ne!(a, b);

        let cards = board.cards().await;
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].handle, a);
        assert_eq!(cards[0].revision, 0);
    }

    #[tokio::test]
    async fn update_replaces_payload_and_bumps_revision() {
        let board = Board::default();
        let handle = board.publish(render_game(&game("1", League::Nba, "0", "0"))).await.unwrap();
        board.update(handle, render_game(&game("1", League::Nba, "3", "0"))).await.unwrap();

        let cards = board.cards().await;
        assert_eq!(cards[0].revision, 1);
        assert_eq!(cards[0].payload.field("Score").unwrap().value, "AWY 3 - 0 HOM");
    }

    #[tokio::test]
    async fn dismissed_card_reports_target_gone() {
        let board = Board::default();
        let handle = board.publish(render_game(&game("1", League::Mlb, "0", "0"))).await.unwrap();
        assert!(board.dismiss(handle).await);
        assert!(!board.dismiss(handle).await);

        let err = board
            .update(handle, render_game(&game("1", League::Mlb, "1", "0")))
            .await
            .unwrap_err();
        assert_eq!(err, SinkError::TargetGone);
        assert_eq!(board.retract(handle).await, Err(SinkError::TargetGone));
        assert!(board.cards().await.is_empty());
    }

    #[tokio::test]
    async fn retract_removes_the_card() {
        let board = Board::default();
        let keep = board.publish(render_game(&game("1", League::Nfl, "0", "0"))).await.unwrap();
        let gone = board.publish(render_game(&game("2", League::Nfl, "0", "0"))).await.unwrap();
        board.retract(gone).await.unwrap();

        let handles: Vec<_> = board.cards().await.iter().map(|c| c.handle).collect();
        assert_eq!(handles, vec![keep]);
    }

    #[tokio::test]
    async fn changes_wake_the_ui_even_when_nobody_is_waiting() {
        let board = Board::default();
        assert!(board.changed().now_or_never().is_none());

        // A burst of changes with no waiter collapses into a single wakeup.
        let handle = board.publish(render_game(&game("1", League::Nhl, "0", "0"))).await.unwrap();
        board.update(handle, render_game(&game("1", League::Nhl, "1", "0"))).await.unwrap();
        board.dismiss(handle).await;
        assert!(board.changed().now_or_never().is_some());
        assert!(board.changed().now_or_never().is_none());
    }
}
