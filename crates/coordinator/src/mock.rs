//! Mock locked sender for exercising interceptors without a transport

use crate::sender::{LockedSender, SendContext};
use async_trait::async_trait;
use parking_lot::Mutex;
use proven_protocol::{BatchRequest, BatchResponse, SendError};
use std::sync::Arc;

type SendFn = Box<dyn FnMut(BatchRequest) -> Result<BatchResponse, SendError> + Send>;

#[derive(Default)]
struct MockState {
    handler: Option<SendFn>,
    received: Vec<BatchRequest>,
}

/// Sender that records every batch and answers with a configurable handler.
///
/// Clones share state, so a test can keep one handle while the other is
/// owned by the interceptor under test. Without a handler, every batch is
/// answered with [`BatchRequest::create_reply`]. A batch sent with an
/// already cancelled or expired context is recorded and then fails with
/// [`SendError::Cancelled`] or [`SendError::DeadlineExceeded`].
#[derive(Clone, Default)]
pub struct MockLockedSender {
    state: Arc<Mutex<MockState>>,
}

impl MockLockedSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the handler used for subsequent sends
    pub fn mock_send<F>(&self, handler: F)
    where
        F: FnMut(BatchRequest) -> Result<BatchResponse, SendError> + Send + 'static,
    {
        self.state.lock().handler = Some(Box::new(handler));
    }

    /// Fall back to echoing replies
    pub fn clear_mock(&self) {
        self.state.lock().handler = None;
    }

    /// Every batch received so far, in order
    pub fn received(&self) -> Vec<BatchRequest> {
        self.state.lock().received.clone()
    }

    pub fn last_batch(&self) -> Option<BatchRequest> {
        self.state.lock().received.last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().received.len()
    }
}

#[async_trait]
impl LockedSender for MockLockedSender {
    async fn send_locked(
        &mut self,
        ctx: &SendContext,
        ba: BatchRequest,
    ) -> Result<BatchResponse, SendError> {
        let mut state = self.state.lock();
        state.received.push(ba.clone());

        if ctx.is_cancelled() {
            return Err(SendError::Cancelled);
        }
        if ctx.is_expired() {
            return Err(SendError::DeadlineExceeded);
        }

        match state.handler.as_mut() {
            Some(handler) => handler(ba),
            None => Ok(ba.create_reply()),
        }
    }
}
