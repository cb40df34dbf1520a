//! Errors returned by senders

use thiserror::Error;

/// Error produced while sending a batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The transaction must restart in a new epoch
    #[error("Transaction retry required: {reason}")]
    TransactionRetry { reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Send cancelled")]
    Cancelled,

    #[error("Send deadline exceeded")]
    DeadlineExceeded,

    #[error("Other error: {0}")]
    Other(String),
}

impl SendError {
    pub fn is_retryable_txn_error(&self) -> bool {
        matches!(self, SendError::TransactionRetry { .. })
    }
}
