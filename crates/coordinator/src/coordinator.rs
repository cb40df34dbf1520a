//! Transaction coordinator owning the interceptor chain

use crate::config::CoordinatorConfig;
use crate::error::{CoordinatorError, Result};
use crate::interceptor::TxnInterceptor;
use crate::sender::{LockedSender, SendContext};
use crate::seq_num_allocator::{SeqNumAllocator, sequences_needed};
use proven_protocol::{BatchRequest, BatchResponse, Transaction, TxnCoordMeta};
use tokio::sync::Mutex as AsyncMutex;

/// Position of a coordinator in distributed execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorRole {
    /// Authoritative coordinator; may restart and finalize the transaction
    Root,
    /// Coordinator initialized from a root's metadata
    Leaf,
}

/// State guarded by the coordinator lock
struct CoordinatorState<S> {
    txn: Transaction,
    seq: SeqNumAllocator<S>,
    closed: bool,
}

impl<S: LockedSender> CoordinatorState<S> {
    fn meta(&self) -> TxnCoordMeta {
        let mut meta = TxnCoordMeta::new(self.txn.clone());
        self.seq.populate_meta_locked(&mut meta);
        meta
    }

    fn restart(&mut self, coordinator_id: &str) {
        self.txn.bump_epoch();
        self.seq.epoch_bumped_locked();
        tracing::debug!(
            coordinator = coordinator_id,
            txn = %self.txn.id,
            epoch = self.txn.epoch,
            "transaction restarted"
        );
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(CoordinatorError::Closed);
        }
        if self.txn.status.is_finalized() {
            return Err(CoordinatorError::TransactionFinalized(self.txn.status));
        }
        Ok(())
    }
}

/// Client-side coordinator for one transaction.
///
/// Every batch goes through the coordinator lock, and from there through the
/// sequence number allocator to the wrapped sender. Restarts and metadata
/// exchange take the same lock, so they never overlap a send.
pub struct TxnCoordinator<S> {
    role: CoordinatorRole,
    config: CoordinatorConfig,
    state: AsyncMutex<CoordinatorState<S>>,
}

impl<S: LockedSender> TxnCoordinator<S> {
    /// Create a root coordinator for a new transaction
    pub fn new_root(name: impl Into<String>, sender: S, config: CoordinatorConfig) -> Self {
        let txn = Transaction::new(name);
        let seq = SeqNumAllocator::with_policy(sender, config.augment_policy);
        Self::with_state(CoordinatorRole::Root, config, txn, seq)
    }

    /// Create a leaf coordinator from a root's metadata
    pub fn new_leaf(meta: &TxnCoordMeta, sender: S, config: CoordinatorConfig) -> Self {
        let mut seq = SeqNumAllocator::with_policy(sender, config.augment_policy);
        seq.augment_meta_locked(meta);
        tracing::debug!(
            coordinator = %config.coordinator_id,
            txn = %meta.txn,
            "leaf coordinator initialized"
        );
        Self::with_state(CoordinatorRole::Leaf, config, meta.txn.clone(), seq)
    }

    /// Create a leaf coordinator from encoded metadata
    pub fn leaf_from_bytes(bytes: &[u8], sender: S, config: CoordinatorConfig) -> Result<Self> {
        let meta = TxnCoordMeta::from_bytes(bytes)?;
        Ok(Self::new_leaf(&meta, sender, config))
    }

    fn with_state(
        role: CoordinatorRole,
        config: CoordinatorConfig,
        txn: Transaction,
        seq: SeqNumAllocator<S>,
    ) -> Self {
        Self {
            role,
            config,
            state: AsyncMutex::new(CoordinatorState {
                txn,
                seq,
                closed: false,
            }),
        }
    }

    pub fn role(&self) -> CoordinatorRole {
        self.role
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Current transaction descriptor, including the latest sequence number
    pub async fn txn(&self) -> Transaction {
        self.state.lock().await.meta().txn
    }

    pub async fn epoch(&self) -> u32 {
        self.state.lock().await.txn.epoch
    }

    /// Send a batch in this transaction
    pub async fn send(&self, ctx: &SendContext, mut ba: BatchRequest) -> Result<BatchResponse> {
        if ctx.is_cancelled() {
            return Err(CoordinatorError::Cancelled);
        }

        let mut state = self.state.lock().await;
        state.check_open()?;
        if self.role == CoordinatorRole::Leaf && ba.has_end_txn() {
            return Err(CoordinatorError::LeafCannotFinalize);
        }

        let needed = sequences_needed(&ba);
        if needed > state.seq.remaining() as usize {
            return Err(CoordinatorError::SequenceExhausted {
                sequence: state.seq.sequence(),
                needed,
            });
        }

        ba.header.txn = Some(state.meta().txn);

        match state.seq.send_locked(ctx, ba).await {
            Ok(br) => {
                if let Some(reply_txn) = &br.header.txn
                    && reply_txn.id == state.txn.id
                    && reply_txn.epoch == state.txn.epoch
                {
                    state.txn.status = reply_txn.status;
                }
                Ok(br)
            }
            Err(err) => {
                if err.is_retryable_txn_error()
                    && self.config.restart_on_retry_error
                    && self.role == CoordinatorRole::Root
                {
                    state.restart(&self.config.coordinator_id);
                }
                Err(err.into())
            }
        }
    }

    /// Restart the transaction into a new epoch
    pub async fn restart(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check_open()?;
        state.restart(&self.config.coordinator_id);
        Ok(())
    }

    /// Snapshot the coordinator state for another coordinator or for storage
    pub async fn get_meta(&self) -> TxnCoordMeta {
        self.state.lock().await.meta()
    }

    /// Encoded form of [`TxnCoordinator::get_meta`]
    pub async fn meta_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.get_meta().await.to_bytes()?)
    }

    /// Import state exported by another coordinator of the same transaction
    pub async fn augment_meta(&self, meta: &TxnCoordMeta) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(CoordinatorError::Closed);
        }
        if meta.txn.id != state.txn.id {
            return Err(CoordinatorError::TransactionMismatch {
                expected: state.txn.id,
                actual: meta.txn.id,
            });
        }

        if meta.txn.epoch < state.txn.epoch {
            tracing::debug!(
                coordinator = %self.config.coordinator_id,
                current = state.txn.epoch,
                stale = meta.txn.epoch,
                "ignoring metadata from a previous epoch"
            );
            return Ok(());
        }
        if meta.txn.epoch > state.txn.epoch {
            state.txn.epoch = meta.txn.epoch;
            state.seq.epoch_bumped_locked();
        }

        state.seq.augment_meta_locked(meta);
        Ok(())
    }

    /// Close the coordinator; later sends fail with [`CoordinatorError::Closed`]
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.seq.close_locked();
        state.closed = true;
        tracing::debug!(
            coordinator = %self.config.coordinator_id,
            txn = %state.txn.id,
            "coordinator closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLockedSender;
    use proven_protocol::{Request, SendError, Sequence, TxnStatus};

    fn root() -> (TxnCoordinator<MockLockedSender>, MockLockedSender) {
        let mock = MockLockedSender::new();
        let coord = TxnCoordinator::new_root("test", mock.clone(), CoordinatorConfig::default());
        (coord, mock)
    }

    fn writes(n: usize) -> BatchRequest {
        let mut ba = BatchRequest::new(None);
        for i in 0..n {
            ba.add(Request::put(format!("k{}", i).as_str(), "v"));
        }
        ba
    }

    #[tokio::test]
    async fn test_send_attaches_transaction() {
        let (coord, mock) = root();

        coord.send(&SendContext::new(), writes(1)).await.unwrap();

        let sent = mock.last_batch().unwrap();
        let txn = sent.header.txn.expect("transaction not attached");
        assert_eq!(txn.id, coord.txn().await.id);
        assert_eq!(coord.txn().await.sequence, 1);
    }

    #[tokio::test]
    async fn test_batch_descriptor_matches_counter() {
        let (coord, mock) = root();
        let ctx = SendContext::new();
        coord.send(&ctx, writes(2)).await.unwrap();
        coord.send(&ctx, writes(1)).await.unwrap();

        let sent = mock.last_batch().unwrap();
        assert_eq!(sent.requests[0].header().sequence, 3);
        assert_eq!(sent.header.txn.unwrap().sequence, 3);
        assert_eq!(coord.txn().await.sequence, 3);

        // A leaf's descriptor moves past the imported baseline too
        let leaf_mock = MockLockedSender::new();
        let leaf =
            TxnCoordinator::new_leaf(&coord.get_meta().await, leaf_mock.clone(), Default::default());
        leaf.send(&ctx, writes(2)).await.unwrap();
        let sent = leaf_mock.last_batch().unwrap();
        assert_eq!(sent.header.txn.unwrap().sequence, 5);
    }

    #[tokio::test]
    async fn test_exhausted_counter_rejects_writes() {
        let (coord, _) = root();
        let mut meta = coord.get_meta().await;
        meta.txn.sequence = Sequence::MAX;
        let bytes = meta.to_bytes().unwrap();

        let leaf_mock = MockLockedSender::new();
        let leaf =
            TxnCoordinator::leaf_from_bytes(&bytes, leaf_mock.clone(), Default::default()).unwrap();
        let ctx = SendContext::new();

        let err = leaf.send(&ctx, writes(1)).await.unwrap_err();
        assert!(matches!(
            err,
            CoordinatorError::SequenceExhausted { needed: 1, .. }
        ));
        assert_eq!(leaf_mock.call_count(), 0);
        assert_eq!(leaf.txn().await.sequence, Sequence::MAX);

        // Reads still go through at the last allocated number
        let reads = BatchRequest::new(None).with(Request::get("k0"));
        leaf.send(&ctx, reads).await.unwrap();
        let sent = leaf_mock.last_batch().unwrap();
        assert_eq!(sent.requests[0].header().sequence, Sequence::MAX);
    }

    #[tokio::test]
    async fn test_batch_larger_than_headroom_rejected() {
        let (coord, mock) = root();
        let mut meta = coord.get_meta().await;
        meta.txn.sequence = Sequence::new(u32::MAX - 1);
        coord.augment_meta(&meta).await.unwrap();

        let err = coord.send(&SendContext::new(), writes(2)).await.unwrap_err();
        assert!(matches!(
            err,
            CoordinatorError::SequenceExhausted { needed: 2, .. }
        ));
        assert_eq!(mock.call_count(), 0);

        coord.send(&SendContext::new(), writes(1)).await.unwrap();
        assert_eq!(coord.txn().await.sequence, Sequence::MAX);
    }

    #[tokio::test]
    async fn test_retry_error_restarts_epoch() {
        let (coord, mock) = root();
        let ctx = SendContext::new();
        coord.send(&ctx, writes(3)).await.unwrap();

        mock.mock_send(|_| {
            Err(SendError::TransactionRetry {
                reason: "write too old".into(),
            })
        });
        let err = coord.send(&ctx, writes(1)).await.unwrap_err();
        assert!(matches!(
            err,
            CoordinatorError::Send(SendError::TransactionRetry { .. })
        ));
        assert_eq!(coord.epoch().await, 1);
        assert_eq!(coord.txn().await.sequence, 0);

        mock.clear_mock();
        coord.send(&ctx, writes(1)).await.unwrap();
        let sent = mock.last_batch().unwrap();
        assert_eq!(sent.requests[0].header().sequence, 1);
        assert_eq!(sent.header.txn.unwrap().epoch, 1);
    }

    #[tokio::test]
    async fn test_retry_error_without_auto_restart() {
        let mock = MockLockedSender::new();
        let config = CoordinatorConfig {
            restart_on_retry_error: false,
            ..Default::default()
        };
        let coord = TxnCoordinator::new_root("test", mock.clone(), config);
        assert!(!coord.config().restart_on_retry_error);
        mock.mock_send(|_| {
            Err(SendError::TransactionRetry {
                reason: "abort span".into(),
            })
        });

        assert!(coord.send(&SendContext::new(), writes(2)).await.is_err());
        assert_eq!(coord.epoch().await, 0);
        assert_eq!(coord.txn().await.sequence, 2);
    }

    #[tokio::test]
    async fn test_commit_finalizes_transaction() {
        let (coord, mock) = root();
        mock.mock_send(|ba| {
            let mut br = ba.create_reply();
            if let Some(txn) = br.header.txn.as_mut() {
                txn.status = TxnStatus::Committed;
            }
            Ok(br)
        });

        let ba = writes(1).with(Request::end_transaction("k0", true));
        coord.send(&SendContext::new(), ba).await.unwrap();
        assert_eq!(coord.txn().await.status, TxnStatus::Committed);

        let err = coord.send(&SendContext::new(), writes(1)).await.unwrap_err();
        assert!(matches!(
            err,
            CoordinatorError::TransactionFinalized(TxnStatus::Committed)
        ));
        assert!(coord.restart().await.is_err());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_leaf_cannot_finalize() {
        let (root, _) = root();
        let leaf_mock = MockLockedSender::new();
        let leaf =
            TxnCoordinator::new_leaf(&root.get_meta().await, leaf_mock.clone(), Default::default());
        assert_eq!(leaf.role(), CoordinatorRole::Leaf);

        let ba = BatchRequest::new(None).with(Request::end_transaction("a", true));
        let err = leaf.send(&SendContext::new(), ba).await.unwrap_err();

        assert!(matches!(err, CoordinatorError::LeafCannotFinalize));
        assert_eq!(leaf_mock.call_count(), 0);
        assert_eq!(leaf.txn().await.sequence, 0);
    }

    #[tokio::test]
    async fn test_leaf_state_flows_back_to_root() {
        let (root, root_mock) = root();
        let ctx = SendContext::new();
        root.send(&ctx, writes(2)).await.unwrap();

        let bytes = root.meta_bytes().await.unwrap();
        let leaf =
            TxnCoordinator::leaf_from_bytes(&bytes, MockLockedSender::new(), Default::default())
                .unwrap();
        leaf.send(&ctx, writes(3)).await.unwrap();

        root.augment_meta(&leaf.get_meta().await).await.unwrap();
        assert_eq!(root.txn().await.sequence, 5);

        root.send(&ctx, writes(1)).await.unwrap();
        let sent = root_mock.last_batch().unwrap();
        assert_eq!(sent.requests[0].header().sequence, 6);
    }

    #[tokio::test]
    async fn test_augment_rejects_other_transaction() {
        let (coord, _) = root();
        let other = TxnCoordMeta::new(Transaction::new("other"));

        let err = coord.augment_meta(&other).await.unwrap_err();

        assert!(matches!(err, CoordinatorError::TransactionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_augment_ignores_previous_epoch() {
        let (coord, _) = root();
        let mut stale = coord.get_meta().await;
        stale.txn.sequence = Sequence::new(10);
        coord.restart().await.unwrap();

        coord.augment_meta(&stale).await.unwrap();

        assert_eq!(coord.txn().await.sequence, 0);
        assert_eq!(coord.epoch().await, 1);
    }

    #[tokio::test]
    async fn test_cancelled_context_rejected_before_sequencing() {
        let (coord, mock) = root();
        let token = tokio_util::sync::CancellationToken::new();
        let ctx = SendContext::with_cancel(token.clone());
        token.cancel();

        let err = coord.send(&ctx, writes(1)).await.unwrap_err();

        assert!(matches!(err, CoordinatorError::Cancelled));
        assert_eq!(mock.call_count(), 0);
        assert_eq!(coord.txn().await.sequence, 0);
    }

    #[tokio::test]
    async fn test_expired_deadline_consumes_sequence() {
        let (coord, mock) = root();
        let ctx = SendContext::new().with_deadline(std::time::Instant::now());

        let err = coord.send(&ctx, writes(2)).await.unwrap_err();

        assert!(matches!(
            err,
            CoordinatorError::Send(SendError::DeadlineExceeded)
        ));
        assert_eq!(mock.call_count(), 1);
        assert_eq!(coord.txn().await.sequence, 2);
    }

    #[tokio::test]
    async fn test_closed_coordinator_rejects_sends() {
        let (coord, mock) = root();
        coord.close().await;
        coord.close().await;

        let err = coord.send(&SendContext::new(), writes(1)).await.unwrap_err();

        assert!(matches!(err, CoordinatorError::Closed));
        assert_eq!(mock.call_count(), 0);
    }
}
