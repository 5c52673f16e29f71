use crate::domain::payment::Payment;
use crate::domain::ports::PaymentStore;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory store for payments.
///
/// Uses `Arc<RwLock<HashMap<Uuid, Payment>>>` to allow shared concurrent access.
/// Contents are lost when the process exits.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.payments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.payments.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create(&self, payment: Payment) -> Result<(), StoreError> {
        let mut payments = self.payments.write().await;
        match payments.entry(payment.id) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(payment.id)),
            Entry::Vacant(slot) => {
                slot.insert(payment);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id).cloned())
    }
}
