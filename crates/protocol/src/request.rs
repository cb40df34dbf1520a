//! Request types carried inside a batch

use crate::method::{Method, RequestFlags};
use crate::sequence::Sequence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key in the key-value keyspace
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key(Vec<u8>);

impl Key {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Header shared by every request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeader {
    /// Start key (or the single key for point requests)
    pub key: Key,

    /// Exclusive end key for range requests
    pub end_key: Option<Key>,

    /// Sequence number within the transaction's current epoch
    pub sequence: Sequence,
}

impl RequestHeader {
    pub fn point(key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn span(key: impl Into<Key>, end_key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            end_key: Some(end_key.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    pub header: RequestHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub header: RequestHeader,
    /// Maximum number of keys to return (0 means unlimited)
    pub max_keys: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRequest {
    pub header: RequestHeader,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalPutRequest {
    pub header: RequestHeader,
    pub value: Vec<u8>,
    /// Value the key must currently hold; `None` requires the key to be absent
    pub expected: Option<Vec<u8>>,
}

/// Put that fails if the key already holds a different value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitPutRequest {
    pub header: RequestHeader,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementRequest {
    pub header: RequestHeader,
    pub increment: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub header: RequestHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRangeRequest {
    pub header: RequestHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginTransactionRequest {
    pub header: RequestHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatTxnRequest {
    pub header: RequestHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndTransactionRequest {
    pub header: RequestHeader,
    /// Commit when true, abort otherwise
    pub commit: bool,
}

/// Any request that can be placed in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    Get(GetRequest),
    Scan(ScanRequest),
    ReverseScan(ScanRequest),
    Put(PutRequest),
    ConditionalPut(ConditionalPutRequest),
    InitPut(InitPutRequest),
    Increment(IncrementRequest),
    Delete(DeleteRequest),
    DeleteRange(DeleteRangeRequest),
    BeginTransaction(BeginTransactionRequest),
    HeartbeatTxn(HeartbeatTxnRequest),
    EndTransaction(EndTransactionRequest),
}

impl Request {
    pub fn get(key: impl Into<Key>) -> Self {
        Request::Get(GetRequest {
            header: RequestHeader::point(key),
        })
    }

    pub fn scan(key: impl Into<Key>, end_key: impl Into<Key>) -> Self {
        Request::Scan(ScanRequest {
            header: RequestHeader::span(key, end_key),
            max_keys: 0,
        })
    }

    pub fn reverse_scan(key: impl Into<Key>, end_key: impl Into<Key>) -> Self {
        Request::ReverseScan(ScanRequest {
            header: RequestHeader::span(key, end_key),
            max_keys: 0,
        })
    }

    pub fn put(key: impl Into<Key>, value: impl Into<Vec<u8>>) -> Self {
        Request::Put(PutRequest {
            header: RequestHeader::point(key),
            value: value.into(),
        })
    }

    pub fn conditional_put(
        key: impl Into<Key>,
        value: impl Into<Vec<u8>>,
        expected: Option<Vec<u8>>,
    ) -> Self {
        Request::ConditionalPut(ConditionalPutRequest {
            header: RequestHeader::point(key),
            value: value.into(),
            expected,
        })
    }

    pub fn init_put(key: impl Into<Key>, value: impl Into<Vec<u8>>) -> Self {
        Request::InitPut(InitPutRequest {
            header: RequestHeader::point(key),
            value: value.into(),
        })
    }

    pub fn increment(key: impl Into<Key>, increment: i64) -> Self {
        Request::Increment(IncrementRequest {
            header: RequestHeader::point(key),
            increment,
        })
    }

    pub fn delete(key: impl Into<Key>) -> Self {
        Request::Delete(DeleteRequest {
            header: RequestHeader::point(key),
        })
    }

    pub fn delete_range(key: impl Into<Key>, end_key: impl Into<Key>) -> Self {
        Request::DeleteRange(DeleteRangeRequest {
            header: RequestHeader::span(key, end_key),
        })
    }

    pub fn begin_transaction(key: impl Into<Key>) -> Self {
        Request::BeginTransaction(BeginTransactionRequest {
            header: RequestHeader::point(key),
        })
    }

    pub fn heartbeat_txn(key: impl Into<Key>) -> Self {
        Request::HeartbeatTxn(HeartbeatTxnRequest {
            header: RequestHeader::point(key),
        })
    }

    pub fn end_transaction(key: impl Into<Key>, commit: bool) -> Self {
        Request::EndTransaction(EndTransactionRequest {
            header: RequestHeader::point(key),
            commit,
        })
    }

    pub fn method(&self) -> Method {
        match self {
            Request::Get(_) => Method::Get,
            Request::Scan(_) => Method::Scan,
            Request::ReverseScan(_) => Method::ReverseScan,
            Request::Put(_) => Method::Put,
            Request::ConditionalPut(_) => Method::ConditionalPut,
            Request::InitPut(_) => Method::InitPut,
            Request::Increment(_) => Method::Increment,
            Request::Delete(_) => Method::Delete,
            Request::DeleteRange(_) => Method::DeleteRange,
            Request::BeginTransaction(_) => Method::BeginTransaction,
            Request::HeartbeatTxn(_) => Method::HeartbeatTxn,
            Request::EndTransaction(_) => Method::EndTransaction,
        }
    }

    pub fn flags(&self) -> RequestFlags {
        self.method().flags()
    }

    pub fn header(&self) -> &RequestHeader {
        match self {
            Request::Get(r) => &r.header,
            Request::Scan(r) | Request::ReverseScan(r) => &r.header,
            Request::Put(r) => &r.header,
            Request::ConditionalPut(r) => &r.header,
            Request::InitPut(r) => &r.header,
            Request::Increment(r) => &r.header,
            Request::Delete(r) => &r.header,
            Request::DeleteRange(r) => &r.header,
            Request::BeginTransaction(r) => &r.header,
            Request::HeartbeatTxn(r) => &r.header,
            Request::EndTransaction(r) => &r.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut RequestHeader {
        match self {
            Request::Get(r) => &mut r.header,
            Request::Scan(r) | Request::ReverseScan(r) => &mut r.header,
            Request::Put(r) => &mut r.header,
            Request::ConditionalPut(r) => &mut r.header,
            Request::InitPut(r) => &mut r.header,
            Request::Increment(r) => &mut r.header,
            Request::Delete(r) => &mut r.header,
            Request::DeleteRange(r) => &mut r.header,
            Request::BeginTransaction(r) => &mut r.header,
            Request::HeartbeatTxn(r) => &mut r.header,
            Request::EndTransaction(r) => &mut r.header,
        }
    }
}
