use crate::render::PresentationPayload;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Opaque reference to something a sink has published. Only the sink that
/// handed it out knows what it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PresentationHandle(u64);

impl PresentationHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PresentationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The published target was removed out from under us (e.g. dismissed).
    #[error("presentation target is gone")]
    TargetGone,
    #[error("presentation sink rejected the payload: {0}")]
    Rejected(String),
}

/// Where rendered games end up. The tracking engine never draws anything
/// itself; it only publishes and updates through this.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    async fn publish(&self, payload: PresentationPayload) -> Result<PresentationHandle, SinkError>;

    async fn update(
        &self,
        handle: PresentationHandle,
        payload: PresentationPayload,
    ) -> Result<(), SinkError>;

    /// Take a published target down. `TargetGone` if it already is.
    async fn retract(&self, handle: PresentationHandle) -> Result<(), SinkError>;
}
