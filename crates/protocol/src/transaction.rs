//! Transaction descriptor carried in batch headers and metadata snapshots

use crate::sequence::Sequence;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transaction identifier using UUIDv7 for time-ordered uniqueness
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a transaction record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnStatus {
    #[default]
    Pending,
    Committed,
    Aborted,
}

impl TxnStatus {
    pub fn is_finalized(self) -> bool {
        !matches!(self, TxnStatus::Pending)
    }
}

impl fmt::Display for TxnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxnStatus::Pending => f.write_str("pending"),
            TxnStatus::Committed => f.write_str("committed"),
            TxnStatus::Aborted => f.write_str("aborted"),
        }
    }
}

/// Transaction descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    /// Human readable name, for logging only
    pub name: String,

    /// Restart attempt; incremented every time the transaction restarts
    pub epoch: u32,

    /// Latest sequence number allocated in the current epoch
    pub sequence: Sequence,

    pub status: TxnStatus,
}

impl Transaction {
    /// Create a fresh pending transaction at epoch zero
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TransactionId::new(),
            name: name.into(),
            epoch: 0,
            sequence: Sequence::ZERO,
            status: TxnStatus::Pending,
        }
    }

    /// Move to the next epoch, discarding sequence numbers of the previous one
    pub fn bump_epoch(&mut self) {
        self.epoch += 1;
        self.sequence = Sequence::ZERO;
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" id={} epoch={} seq={} status={}",
            self.name, self.id, self.epoch, self.sequence, self.status
        )
    }
}
