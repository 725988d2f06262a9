//! # ember-receipts
//!
//! Durable record of transaction execution: RLP-encoded receipts keyed by
//! block hash, a tx-hash → (block, index) lookup index with bounded
//! retention, and budgeted log range queries with address and ordered-topic
//! filtering.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod kv;
mod receipt;
mod store;

pub use kv::{KeyValueStore, KvError, MemoryKv};
pub use receipt::{TxReceipt, TxReceiptWithType};
pub use store::{
    BlockRef, ChainView, LogEntry, ReceiptStore, ReceiptStoreConfig, ReceiptWithMeta, StoreError,
    TopicFilter,
};
