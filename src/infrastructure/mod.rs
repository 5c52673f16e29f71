//! Adapters behind the domain ports: payment stores, the HTTP authorizer
//! and clocks.

pub mod clock;
pub mod http_authorizer;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::domain::ports::PaymentStoreBox;
use crate::error::Result;
use std::path::Path;

/// Picks the payment store for this process.
///
/// A `db_path` selects RocksDB when the `storage-rocksdb` feature is built in;
/// otherwise payments live in memory.
pub fn open_store(db_path: Option<&Path>) -> Result<PaymentStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            tracing::info!(path = %path.display(), "opening RocksDB payment store");
            Ok(Box::new(self::rocksdb::RocksDbPaymentStore::open(path)?))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            tracing::warn!(
                path = %path.display(),
                "persistent storage requested via --db-path, but the 'storage-rocksdb' feature is not enabled; falling back to in-memory storage"
            );
            Ok(Box::new(in_memory::InMemoryPaymentStore::new()))
        }
        None => Ok(Box::new(in_memory::InMemoryPaymentStore::new())),
    }
}
