//! The locked-sender seam between interceptors

use async_trait::async_trait;
use proven_protocol::{BatchRequest, BatchResponse, SendError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-call context handed down the interceptor chain
#[derive(Debug, Clone, Default)]
pub struct SendContext {
    /// Cancelled when the caller gives up on the batch
    pub cancel: CancellationToken,

    /// Point in time after which the send should give up
    pub deadline: Option<Instant>,
}

impl SendContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Next link in a coordinator's interceptor chain.
///
/// `send_locked` is only ever invoked while the owning coordinator's lock is
/// held; the `&mut self` receiver is how that precondition is expressed, since
/// the coordinator hands out mutable access to its chain only through its
/// lock guard.
#[async_trait]
pub trait LockedSender: Send {
    async fn send_locked(
        &mut self,
        ctx: &SendContext,
        ba: BatchRequest,
    ) -> Result<BatchResponse, SendError>;
}

#[async_trait]
impl<S: LockedSender + ?Sized> LockedSender for Box<S> {
    async fn send_locked(
        &mut self,
        ctx: &SendContext,
        ba: BatchRequest,
    ) -> Result<BatchResponse, SendError> {
        (**self).send_locked(ctx, ba).await
    }
}
