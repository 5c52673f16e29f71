//! HTTP surface of the gateway.
//!
//! Each handler extracts data from the request, calls the orchestrator and
//! maps the outcome onto a status code.

use crate::application::orchestrator::PaymentOrchestrator;
use crate::domain::payment::{PaymentOutcome, PaymentRequest, PaymentView};
use crate::error::PaymentError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

pub fn router(orchestrator: Arc<PaymentOrchestrator>) -> Router {
    Router::new()
        .route("/process_payment", post(process_payment))
        .route("/retrieve_payment/{id}", get(retrieve_payment))
        .with_state(orchestrator)
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let status = match &self {
            PaymentError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PaymentError::DuplicatePaymentError => StatusCode::CONFLICT,
            PaymentError::AuthorizationBackendError(_) => StatusCode::BAD_GATEWAY,
            PaymentError::NotFoundError(_) => StatusCode::NOT_FOUND,
            PaymentError::PersistenceError(_)
            | PaymentError::ConfigError(_)
            | PaymentError::CsvError(_)
            | PaymentError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_body(status, self.to_string())
    }
}

/// Process a payment
///
/// Body: a JSON `PaymentRequest`. Answers `{"id", "status"}` once the
/// payment has been authorized and recorded.
async fn process_payment(
    State(orchestrator): State<Arc<PaymentOrchestrator>>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentOutcome>, Response> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "malformed payment request");
        error_body(StatusCode::BAD_REQUEST, "Invalid request format")
    })?;

    orchestrator
        .process_payment(request)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

/// Retrieve a payment by id, card number masked.
async fn retrieve_payment(
    State(orchestrator): State<Arc<PaymentOrchestrator>>,
    Path(id): Path<String>,
) -> Result<Json<PaymentView>, Response> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| error_body(StatusCode::BAD_REQUEST, "Invalid payment ID"))?;

    orchestrator
        .retrieve_payment(id)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}
