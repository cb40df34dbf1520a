//! Interceptor contract for the coordinator's send chain

use crate::sender::LockedSender;
use proven_protocol::TxnCoordMeta;

/// A link in the coordinator's interceptor chain.
///
/// Every method runs under the coordinator's lock, like
/// [`LockedSender::send_locked`], and is never invoked concurrently with a
/// send on the same instance.
pub trait TxnInterceptor: LockedSender {
    /// The sender this interceptor forwards to
    type Wrapped: LockedSender;

    /// Replace the next link in the chain
    fn set_wrapped(&mut self, wrapped: Self::Wrapped);

    /// Export this interceptor's state into a metadata snapshot
    fn populate_meta_locked(&self, meta: &mut TxnCoordMeta);

    /// Import state from a metadata snapshot
    fn augment_meta_locked(&mut self, meta: &TxnCoordMeta);

    /// The transaction restarted into a new epoch
    fn epoch_bumped_locked(&mut self);

    /// The coordinator is shutting down
    fn close_locked(&mut self);
}
