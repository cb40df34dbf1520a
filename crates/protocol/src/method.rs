//! Request methods and the flags that describe them
//!
//! Every method the protocol knows about declares its behavior through
//! [`RequestFlags`]. Components that need to reason about a request (for
//! example whether it writes an intent or finalizes a transaction) query the
//! flags instead of matching on individual methods, so a new method only has
//! to declare its flags here.

use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Behavioral properties of a request method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RequestFlags: u32 {
        /// Reads data without modifying it.
        const READ = 1;
        /// Modifies data.
        const WRITE = 1 << 1;
        /// Leaves an intent when issued inside a transaction.
        const TXN_WRITE = 1 << 2;
        /// Operates on a key range rather than a single key.
        const RANGE = 1 << 3;
        /// Transaction record bookkeeping (begin, heartbeat).
        const TXN_LIFECYCLE = 1 << 4;
        /// Commits or aborts the transaction.
        const ENDS_TXN = 1 << 5;
    }
}

/// Protocol method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Scan,
    ReverseScan,
    Put,
    ConditionalPut,
    InitPut,
    Increment,
    Delete,
    DeleteRange,
    BeginTransaction,
    HeartbeatTxn,
    EndTransaction,
}

impl Method {
    /// Flags declared by this method
    pub const fn flags(self) -> RequestFlags {
        match self {
            Method::Get => RequestFlags::READ,
            Method::Scan | Method::ReverseScan => {
                RequestFlags::READ.union(RequestFlags::RANGE)
            }
            Method::Put
            | Method::ConditionalPut
            | Method::InitPut
            | Method::Increment
            | Method::Delete => RequestFlags::WRITE.union(RequestFlags::TXN_WRITE),
            Method::DeleteRange => RequestFlags::WRITE
                .union(RequestFlags::TXN_WRITE)
                .union(RequestFlags::RANGE),
            Method::BeginTransaction | Method::HeartbeatTxn => {
                RequestFlags::WRITE.union(RequestFlags::TXN_LIFECYCLE)
            }
            Method::EndTransaction => RequestFlags::WRITE
                .union(RequestFlags::TXN_LIFECYCLE)
                .union(RequestFlags::ENDS_TXN),
        }
    }

    /// Whether the method leaves intents inside a transaction
    pub fn is_txn_write(self) -> bool {
        self.flags().contains(RequestFlags::TXN_WRITE)
    }

    /// Whether the method only reads
    pub fn is_read_only(self) -> bool {
        let flags = self.flags();
        flags.contains(RequestFlags::READ) && !flags.contains(RequestFlags::WRITE)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "Get",
            Method::Scan => "Scan",
            Method::ReverseScan => "ReverseScan",
            Method::Put => "Put",
            Method::ConditionalPut => "ConditionalPut",
            Method::InitPut => "InitPut",
            Method::Increment => "Increment",
            Method::Delete => "Delete",
            Method::DeleteRange => "DeleteRange",
            Method::BeginTransaction => "BeginTransaction",
            Method::HeartbeatTxn => "HeartbeatTxn",
            Method::EndTransaction => "EndTransaction",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
