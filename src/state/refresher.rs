use crate::state::messages::UiEvent;
use crate::tracking::{PresentationSink, Reconciler};
use log::debug;
use scoreboard_api::ScoreFeed;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

/// Drives the reconciler on a fixed period. Passes run inline in this task, so
/// they never overlap; ticks that come due during a slow pass are dropped.
pub struct PeriodicRefresher<F, S> {
    reconciler: Reconciler<F, S>,
    period: Duration,
    ui_events: mpsc::Sender<UiEvent>,
}

impl<F: ScoreFeed, S: PresentationSink> PeriodicRefresher<F, S> {
    pub fn new(
        reconciler: Reconciler<F, S>,
        period: Duration,
        ui_events: mpsc::Sender<UiEvent>,
    ) -> Self {
        Self { reconciler, period, ui_events }
    }

    pub async fn run(self) {
        let mut pass_interval = interval(self.period);
        pass_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Skip the immediate first tick; nothing is tracked at startup.
        pass_interval.tick().await;

        loop {
            pass_interval.tick().await;
            let report = self.reconciler.run_pass().await;
            if report.tracked == 0 {
                continue;
            }
            if self.ui_events.send(UiEvent::PassCompleted(report)).await.is_err() {
                debug!("UI gone, stopping tracking loop");
                break;
            }
        }
    }
}
