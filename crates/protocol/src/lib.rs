//! Wire-protocol types for transactional key-value batches
//!
//! This crate defines:
//! - Request methods and their behavioral flags
//! - Requests, batches and responses
//! - The transaction descriptor and per-epoch sequence numbers
//! - Coordinator metadata snapshots exchanged between coordinators

pub mod batch;
pub mod error;
pub mod meta;
pub mod method;
pub mod request;
pub mod sequence;
pub mod transaction;

pub use batch::{
    BatchHeader, BatchRequest, BatchResponse, BatchResponseHeader, KeyValue, Response,
};
pub use error::SendError;
pub use meta::TxnCoordMeta;
pub use method::{Method, RequestFlags};
pub use request::{Key, Request, RequestHeader};
pub use sequence::Sequence;
pub use transaction::{Transaction, TransactionId, TxnStatus};
