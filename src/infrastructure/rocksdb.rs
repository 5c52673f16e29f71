use crate::domain::payment::Payment;
use crate::domain::ports::PaymentStore;
use crate::error::StoreError;
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for storing payment records.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent payment store backed by RocksDB.
///
/// Records are kept as JSON under their 16-byte identifier in the
/// "payments" column family. Creates go through a write lock so the
/// existence check and the put form one step.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbPaymentStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDbPaymentStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn payments_cf(&self) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db.cf_handle(CF_PAYMENTS).ok_or_else(|| {
            StoreError::Backend(Box::new(std::io::Error::other(
                "Payments column family not found",
            )))
        })
    }
}

#[async_trait]
impl PaymentStore for RocksDbPaymentStore {
    async fn create(&self, payment: Payment) -> Result<(), StoreError> {
        let key = payment.id.into_bytes();
        let value = serde_json::to_vec(&payment)?;

        let _guard = self.write_lock.lock().await;
        let cf = self.payments_cf()?;
        if self.db.get_pinned_cf(cf, key)?.is_some() {
            return Err(StoreError::AlreadyExists(payment.id));
        }
        self.db.put_cf(cf, key, value)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
        let cf = self.payments_cf()?;
        match self.db.get_pinned_cf(cf, id.into_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
