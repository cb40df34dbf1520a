//! Coordinator metadata snapshots
//!
//! A [`TxnCoordMeta`] carries the state one coordinator hands to another:
//! a root coordinator initializing a leaf, a leaf reporting its final state
//! back to the root, or a coordinator persisting itself for later restore.

use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Snapshot of a transaction coordinator's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnCoordMeta {
    pub txn: Transaction,
}

impl TxnCoordMeta {
    pub fn new(txn: Transaction) -> Self {
        Self { txn }
    }

    /// Encode as JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
