//! Batch requests and responses

use crate::method::{Method, RequestFlags};
use crate::request::{Key, Request};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Header shared by all requests of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeader {
    /// Transaction the batch runs in, if any
    pub txn: Option<Transaction>,
}

/// Ordered set of requests sent together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub header: BatchHeader,
    pub requests: Vec<Request>,
}

impl BatchRequest {
    pub fn new(txn: Option<Transaction>) -> Self {
        Self {
            header: BatchHeader { txn },
            requests: Vec::new(),
        }
    }

    /// Append a request to the end of the batch
    pub fn add(&mut self, request: Request) -> &mut Self {
        self.requests.push(request);
        self
    }

    pub fn with(mut self, request: Request) -> Self {
        self.requests.push(request);
        self
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Whether every request in the batch only reads
    pub fn is_read_only(&self) -> bool {
        self.requests.iter().all(|r| r.method().is_read_only())
    }

    /// Whether the batch finalizes its transaction
    pub fn has_end_txn(&self) -> bool {
        self.requests
            .iter()
            .any(|r| r.flags().contains(RequestFlags::ENDS_TXN))
    }

    /// Build an empty reply with one response per request, in order
    pub fn create_reply(&self) -> BatchResponse {
        BatchResponse {
            header: BatchResponseHeader {
                txn: self.header.txn.clone(),
            },
            responses: self
                .requests
                .iter()
                .map(|r| Response::empty(r.method()))
                .collect(),
        }
    }
}

/// Key-value pair returned by reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: Key,
    pub value: Vec<u8>,
}

/// Response to a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub method: Method,
    pub rows: Vec<KeyValue>,
}

impl Response {
    pub fn empty(method: Method) -> Self {
        Self {
            method,
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponseHeader {
    /// Transaction state as observed by the server
    pub txn: Option<Transaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub header: BatchResponseHeader,
    pub responses: Vec<Response>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_reply_matches_requests() {
        let txn = Transaction::new("reply");
        let ba = BatchRequest::new(Some(txn.clone()))
            .with(Request::get("a"))
            .with(Request::put("a", "1"))
            .with(Request::end_transaction("a", true));

        let br = ba.create_reply();

        assert_eq!(br.header.txn, Some(txn));
        let methods: Vec<_> = br.responses.iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![Method::Get, Method::Put, Method::EndTransaction]
        );
    }

    #[test]
    fn test_batch_classification() {
        let reads = BatchRequest::new(None)
            .with(Request::get("a"))
            .with(Request::scan("a", "b"));
        assert!(reads.is_read_only());
        assert!(!reads.has_end_txn());

        let mut mixed = reads.clone();
        mixed.add(Request::put("a", "1"));
        assert!(!mixed.is_read_only());

        mixed.add(Request::end_transaction("a", false));
        assert!(mixed.has_end_txn());
    }
}
