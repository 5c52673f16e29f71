use super::duplicate_guard::DuplicateGuard;
use crate::domain::identifier::{IdGranularity, derive_payment_id};
use crate::domain::payment::{Payment, PaymentOutcome, PaymentRequest, PaymentView};
use crate::domain::ports::{AuthorizerBox, ClockRef, PaymentStoreBox};
use crate::error::{PaymentError, Result};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// The end-to-end "process payment" and "retrieve payment" operations.
///
/// `PaymentOrchestrator` owns its collaborators: the duplicate guard, the
/// authorizer and the payment store are injected at construction. It is
/// `Send + Sync` and meant to be shared behind an `Arc` by every request
/// handler.
pub struct PaymentOrchestrator {
    guard: DuplicateGuard,
    authorizer: AuthorizerBox,
    store: PaymentStoreBox,
    clock: ClockRef,
    granularity: IdGranularity,
}

impl PaymentOrchestrator {
    /// Creates a new `PaymentOrchestrator`.
    ///
    /// # Arguments
    ///
    /// * `guard` - Replay protection, exclusively owned by this orchestrator.
    /// * `authorizer` - The external authorization backend.
    /// * `store` - Where recorded payments live.
    /// * `clock` - Time source for identifiers and creation timestamps.
    /// * `granularity` - Timestamp precision used when deriving identifiers.
    pub fn new(
        guard: DuplicateGuard,
        authorizer: AuthorizerBox,
        store: PaymentStoreBox,
        clock: ClockRef,
        granularity: IdGranularity,
    ) -> Self {
        Self {
            guard,
            authorizer,
            store,
            clock,
            granularity,
        }
    }

    /// Validates, deduplicates, authorizes and records a payment.
    ///
    /// Declines are recorded like approvals. A backend failure records
    /// nothing. A store failure after a verdict leaves the payment
    /// authorized by the backend but unrecorded here; it is surfaced as
    /// `PersistenceError` and never retried, since a blind retry could
    /// charge twice.
    #[instrument(skip_all, fields(currency = %request.currency, amount = %request.amount))]
    pub async fn process_payment(&self, request: PaymentRequest) -> Result<PaymentOutcome> {
        let amount = request.validate().inspect_err(|e| warn!(error = %e, "rejected request"))?;

        if self.guard.check_and_register(&request, &amount) {
            warn!("duplicate payment rejected");
            return Err(PaymentError::DuplicatePaymentError);
        }

        let verdict = self
            .authorizer
            .authorize(&request)
            .await
            .inspect_err(|e| error!(error = %e, "authorization failed"))?;

        let created_at = self.clock.now();
        let id = derive_payment_id(&request.card_number, &amount, created_at, self.granularity);
        let payment = Payment::authorized(id, &request, amount, verdict, created_at);

        self.store.create(payment).await.map_err(|e| {
            error!(
                payment_id = %id,
                status = %verdict,
                error = %e,
                "backend returned a verdict but the payment could not be recorded"
            );
            PaymentError::PersistenceError(e)
        })?;

        info!(payment_id = %id, status = %verdict, "payment recorded");
        Ok(PaymentOutcome { id, status: verdict })
    }

    /// Looks a payment up; the card number comes back masked.
    #[instrument(skip(self))]
    pub async fn retrieve_payment(&self, id: Uuid) -> Result<PaymentView> {
        match self.store.find_by_id(id).await? {
            Some(payment) => Ok(payment.view()),
            None => {
                info!("payment not found");
                Err(PaymentError::NotFoundError(id))
            }
        }
    }
}
