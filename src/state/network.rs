use crate::commands::Commands;
use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::tracking::PresentationSink;
use log::{debug, error};
use scoreboard_api::ScoreFeed;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs user commands one at a time, off the UI task.
pub struct NetworkWorker<F, S> {
    commands: Commands<F, S>,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl<F: ScoreFeed + 'static, S: PresentationSink + 'static> NetworkWorker<F, S> {
    pub fn new(
        commands: Commands<F, S>,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self { commands, requests, responses, is_loading: Arc::new(AtomicBool::new(false)) }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            debug!("handling {request:?}");
            self.start_loading_animation().await;

            let responses = match request {
                NetworkRequest::LoadScores { league } => self.commands.scores(league).await,
                NetworkRequest::TrackLeague { league } => self.commands.track_league(league).await,
                NetworkRequest::TrackGame { league, number } => {
                    self.commands.track_game(league, number).await
                }
                NetworkRequest::DismissCard { handle } => self.commands.dismiss(handle).await,
                NetworkRequest::StopTracking => self.commands.stop_tracking().await,
            };

            let is_ok = !responses.iter().any(|r| matches!(r, NetworkResponse::Error { .. }));
            self.stop_loading_animation(is_ok).await;

            for response in responses {
                if let Err(e) = self.responses.send(response).await {
                    error!("Failed to send network response: {e}");
                    return;
                }
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
