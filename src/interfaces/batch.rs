use crate::application::orchestrator::PaymentOrchestrator;
use crate::domain::payment::PaymentView;
use crate::interfaces::csv::payment_reader::PaymentReader;
use std::io::Read;
use tracing::error;

/// Runs every CSV row through the orchestrator, in order.
///
/// A row that cannot be read, processed or read back is logged and skipped;
/// the rest of the batch carries on. Returns the views of the recorded payments.
pub async fn process_batch<R: Read>(
    orchestrator: &PaymentOrchestrator,
    source: R,
) -> Vec<PaymentView> {
    let mut recorded = Vec::new();
    for request in PaymentReader::new(source).requests() {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                error!("Error reading payment: {e}");
                continue;
            }
        };

        let outcome = match orchestrator.process_payment(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error processing payment: {e}");
                continue;
            }
        };

        match orchestrator.retrieve_payment(outcome.id).await {
            Ok(view) => recorded.push(view),
            Err(e) => error!(
                payment_id = %outcome.id,
                status = %outcome.status,
                "Error reading back recorded payment: {e}"
            ),
        }
    }
    recorded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::duplicate_guard::{DEFAULT_WINDOW, DuplicateGuard};
    use crate::domain::identifier::IdGranularity;
    use crate::domain::payment::{AuthorizationVerdict, Payment, PaymentRequest};
    use crate::domain::ports::{Authorizer, PaymentStore};
    use crate::error::{AuthorizationFailure, StoreError};
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::in_memory::InMemoryPaymentStore;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    struct ApproveAll;

    #[async_trait]
    impl Authorizer for ApproveAll {
        async fn authorize(
            &self,
            _request: &PaymentRequest,
        ) -> Result<AuthorizationVerdict, AuthorizationFailure> {
            Ok(AuthorizationVerdict::Approved)
        }
    }

    /// Fails the first lookup, then behaves like the wrapped store.
    struct FirstReadFails {
        inner: InMemoryPaymentStore,
        failed: AtomicBool,
    }

    #[async_trait]
    impl PaymentStore for FirstReadFails {
        async fn create(&self, payment: Payment) -> Result<(), StoreError> {
            self.inner.create(payment).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(StoreError::Backend(Box::new(std::io::Error::other(
                    "read timed out",
                ))));
            }
            self.inner.find_by_id(id).await
        }
    }

    fn orchestrator(store: impl PaymentStore + 'static) -> PaymentOrchestrator {
        let clock = Arc::new(SystemClock);
        PaymentOrchestrator::new(
            DuplicateGuard::new(DEFAULT_WINDOW, clock.clone()),
            Box::new(ApproveAll),
            Box::new(store),
            clock,
            IdGranularity::Nanos,
        )
    }

    const CSV: &str = "card_number,expiry_month,expiry_year,cvv,amount,currency\n\
                       4242424242424242,12,2024,123,10.00,USD\n\
                       4242424242424242,12,2024,123,lots,USD\n\
                       5555555555554444,01,2026,456,20.00,EUR\n";

    #[tokio::test]
    async fn test_batch_skips_bad_rows_and_keeps_going() {
        let store = InMemoryPaymentStore::new();
        let views = process_batch(&orchestrator(store.clone()), CSV.as_bytes()).await;

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].card_number, "**** **** **** 4242");
        assert_eq!(views[1].card_number, "**** **** **** 4444");
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_failed_read_back_does_not_abort_batch() {
        let inner = InMemoryPaymentStore::new();
        let store = FirstReadFails {
            inner: inner.clone(),
            failed: AtomicBool::new(false),
        };

        let views = process_batch(&orchestrator(store), CSV.as_bytes()).await;

        // Both payments were recorded; only the second could be read back.
        assert_eq!(inner.len().await, 2);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].card_number, "**** **** **** 4444");
    }
}
