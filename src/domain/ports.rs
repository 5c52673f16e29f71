use super::payment::{AuthorizationVerdict, Payment, PaymentRequest};
use crate::error::{AuthorizationFailure, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Durable home of recorded payments.
///
/// Implementations provide their own concurrency safety; `create` must be
/// atomic per identifier and reject one that already exists.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create(&self, payment: Payment) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, StoreError>;
}

/// The external backend that approves or declines a payment.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(
        &self,
        request: &PaymentRequest,
    ) -> Result<AuthorizationVerdict, AuthorizationFailure>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type AuthorizerBox = Box<dyn Authorizer>;
pub type ClockRef = Arc<dyn Clock>;
