//! A stand-in for the card issuer's authorization endpoint.
//!
//! Approves a configurable share of requests at random and declines the rest.

use crate::domain::payment::{AuthorizationVerdict, PaymentRequest, mask_card_number};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use rand::Rng;
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub const DEFAULT_APPROVAL_RATE: f64 = 0.8;

#[derive(Debug, Clone, Copy)]
struct Simulator {
    approval_rate: f64,
}

#[derive(Serialize)]
struct SimulatedAuthorization {
    status: AuthorizationVerdict,
    masked_card_number: String,
}

/// Routes for the simulated bank. `approval_rate` is clamped to `0.0..=1.0`;
/// NaN falls back to [`DEFAULT_APPROVAL_RATE`].
pub fn router(approval_rate: f64) -> Router {
    let approval_rate = if approval_rate.is_nan() {
        DEFAULT_APPROVAL_RATE
    } else {
        approval_rate.clamp(0.0, 1.0)
    };
    let simulator = Simulator { approval_rate };
    Router::new()
        .route("/simulate_bank", post(simulate_bank))
        .with_state(simulator)
}

/// Serves the simulated bank on `listener` until the process stops.
pub async fn serve(listener: TcpListener, approval_rate: f64) -> std::io::Result<()> {
    axum::serve(listener, router(approval_rate)).await
}

async fn simulate_bank(
    State(simulator): State<Simulator>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        warn!("simulated bank received a malformed request");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid request" })),
        )
            .into_response();
    };

    let status = if rand::thread_rng().gen_bool(simulator.approval_rate) {
        AuthorizationVerdict::Approved
    } else {
        AuthorizationVerdict::Declined
    };
    info!(?request, %status, "simulated bank decided");

    Json(SimulatedAuthorization {
        status,
        masked_card_number: mask_card_number(&request.card_number),
    })
    .into_response()
}
