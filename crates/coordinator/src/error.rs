//! Error types for the coordinator

use proven_protocol::{SendError, Sequence, TransactionId, TxnStatus};
use thiserror::Error;

/// Coordinator error types
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// Error returned by the interceptor chain, passed through untouched
    #[error(transparent)]
    Send(#[from] SendError),

    #[error("Send cancelled before it started")]
    Cancelled,

    #[error("Coordinator is closed")]
    Closed,

    #[error("Transaction already finalized: {0}")]
    TransactionFinalized(TxnStatus),

    #[error("Sequence numbers exhausted at {sequence}: batch needs {needed}")]
    SequenceExhausted { sequence: Sequence, needed: usize },

    #[error("Leaf coordinators cannot finalize a transaction")]
    LeafCannotFinalize,

    #[error("Metadata belongs to transaction {actual}, expected {expected}")]
    TransactionMismatch {
        expected: TransactionId,
        actual: TransactionId,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for coordinator operations
pub type Result<T> = std::result::Result<T, CoordinatorError>;
