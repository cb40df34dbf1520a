//! Sequence number allocation for transactional batches
//!
//! The allocator is the interceptor that numbers the requests of a
//! transaction. Within one epoch, every request that writes an intent or
//! finalizes the transaction is given a sequence number one larger than any
//! handed out before it. All other requests carry the latest number
//! allocated so far, so a read observes exactly the writes that precede it
//! in the transaction.
//!
//! Numbers are allocated before the batch is forwarded and are never given
//! back: a failed or cancelled send still consumes its numbers. Retrying the
//! same logical operation must reuse the numbers already assigned to it.
//!
//! The counter stops at [`Sequence::MAX`]. Owners check
//! [`SeqNumAllocator::remaining`] against [`sequences_needed`] before
//! sending; the allocator itself never wraps.

use crate::config::AugmentPolicy;
use crate::interceptor::TxnInterceptor;
use crate::sender::{LockedSender, SendContext};
use async_trait::async_trait;
use proven_protocol::{
    BatchRequest, BatchResponse, Request, RequestFlags, SendError, Sequence, TxnCoordMeta,
};

/// Interceptor assigning per-epoch sequence numbers to requests.
///
/// All methods require the owning coordinator's lock; see [`LockedSender`].
pub struct SeqNumAllocator<S> {
    wrapped: S,

    /// Latest sequence number allocated in the current epoch
    seq_gen: Sequence,

    augment_policy: AugmentPolicy,
}

impl<S: LockedSender> SeqNumAllocator<S> {
    pub fn new(wrapped: S) -> Self {
        Self::with_policy(wrapped, AugmentPolicy::default())
    }

    pub fn with_policy(wrapped: S, augment_policy: AugmentPolicy) -> Self {
        Self {
            wrapped,
            seq_gen: Sequence::ZERO,
            augment_policy,
        }
    }

    /// Latest sequence number allocated in the current epoch
    pub fn sequence(&self) -> Sequence {
        self.seq_gen
    }

    /// Sequence numbers still available in the current epoch
    pub fn remaining(&self) -> u32 {
        self.seq_gen.remaining()
    }

    pub fn wrapped(&self) -> &S {
        &self.wrapped
    }

    pub fn wrapped_mut(&mut self) -> &mut S {
        &mut self.wrapped
    }

    /// Number every request of the batch in submission order, then record
    /// the resulting counter on the batch's transaction descriptor
    fn assign_sequences(&mut self, ba: &mut BatchRequest) {
        let before = self.seq_gen;
        for request in ba.requests.iter_mut() {
            if consumes_sequence(request) {
                match self.seq_gen.checked_next() {
                    Some(next) => self.seq_gen = next,
                    None => tracing::error!(
                        method = %request.method(),
                        "sequence numbers exhausted, reusing {}",
                        self.seq_gen
                    ),
                }
            }
            request.header_mut().sequence = self.seq_gen;
        }
        if let Some(txn) = ba.header.txn.as_mut() {
            txn.sequence = self.seq_gen;
        }

        tracing::trace!(
            requests = ba.requests.len(),
            %before,
            after = %self.seq_gen,
            "assigned sequence numbers"
        );
    }
}

/// Whether a request takes a fresh sequence number.
///
/// Intent writes and transaction finalization do; reads and transaction
/// record bookkeeping reuse the current one, which keeps read-only batches
/// read-only.
pub fn consumes_sequence(request: &Request) -> bool {
    request
        .flags()
        .intersects(RequestFlags::TXN_WRITE | RequestFlags::ENDS_TXN)
}

/// How many fresh sequence numbers a batch takes
pub fn sequences_needed(ba: &BatchRequest) -> usize {
    ba.requests.iter().filter(|r| consumes_sequence(r)).count()
}

#[async_trait]
impl<S: LockedSender> LockedSender for SeqNumAllocator<S> {
    async fn send_locked(
        &mut self,
        ctx: &SendContext,
        mut ba: BatchRequest,
    ) -> Result<BatchResponse, SendError> {
        self.assign_sequences(&mut ba);
        self.wrapped.send_locked(ctx, ba).await
    }
}

impl<S: LockedSender> TxnInterceptor for SeqNumAllocator<S> {
    type Wrapped = S;

    fn set_wrapped(&mut self, wrapped: S) {
        self.wrapped = wrapped;
    }

    fn populate_meta_locked(&self, meta: &mut TxnCoordMeta) {
        meta.txn.sequence = self.seq_gen;
    }

    fn augment_meta_locked(&mut self, meta: &TxnCoordMeta) {
        let imported = meta.txn.sequence;
        match self.augment_policy {
            AugmentPolicy::Monotonic if imported < self.seq_gen => {
                tracing::warn!(
                    current = %self.seq_gen,
                    %imported,
                    "ignoring sequence baseline below the local counter"
                );
            }
            _ => {
                tracing::debug!(
                    from = %self.seq_gen,
                    to = %imported,
                    "augmented sequence counter"
                );
                self.seq_gen = imported;
            }
        }
    }

    fn epoch_bumped_locked(&mut self) {
        tracing::debug!(discarded = %self.seq_gen, "epoch bumped, resetting sequence counter");
        self.seq_gen = Sequence::ZERO;
    }

    fn close_locked(&mut self) {
        tracing::trace!(sequence = %self.seq_gen, "sequence allocator closed");
    }
}
