//! Client-side transaction coordination
//!
//! This crate provides the coordinator that drives one transaction from the
//! client side, and the interceptor chain its batches pass through. The
//! interceptor shipped here is the sequence number allocator, which numbers
//! every request of a transaction within its current epoch.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod interceptor;
pub mod mock;
pub mod sender;
pub mod seq_num_allocator;

pub use config::{AugmentPolicy, CoordinatorConfig};
pub use coordinator::{CoordinatorRole, TxnCoordinator};
pub use error::{CoordinatorError, Result};
pub use interceptor::TxnInterceptor;
pub use mock::MockLockedSender;
pub use sender::{LockedSender, SendContext};
pub use seq_num_allocator::{SeqNumAllocator, consumes_sequence, sequences_needed};
