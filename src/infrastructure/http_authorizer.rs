use crate::domain::payment::{AuthorizationVerdict, PaymentRequest};
use crate::domain::ports::Authorizer;
use crate::error::AuthorizationFailure;
use async_trait::async_trait;
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Body posted to the authorization backend.
#[derive(Serialize)]
struct AuthorizationRequest<'a> {
    card_number: &'a str,
    expiry_month: &'a str,
    expiry_year: &'a str,
    cvv: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    currency: &'a str,
}

impl<'a> From<&'a PaymentRequest> for AuthorizationRequest<'a> {
    fn from(request: &'a PaymentRequest) -> Self {
        Self {
            card_number: &request.card_number,
            expiry_month: &request.expiry_month,
            expiry_year: &request.expiry_year,
            cvv: &request.cvv,
            amount: request.amount,
            currency: &request.currency,
        }
    }
}

#[derive(Deserialize)]
struct AuthorizationResponse {
    status: AuthorizationVerdict,
}

/// Talks to the authorization backend over HTTP.
///
/// Every exchange runs under `timeout`. When the deadline passes the
/// in-flight request is dropped, which hands its connection back to the
/// pool; the same happens on every error path.
#[derive(Clone)]
pub struct HttpAuthorizer {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpAuthorizer {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, AuthorizationFailure> {
        let client = Client::builder()
            .pool_max_idle_per_host(50)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(AuthorizationFailure::Transport)?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    async fn exchange(
        &self,
        request: &PaymentRequest,
    ) -> Result<AuthorizationVerdict, AuthorizationFailure> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&AuthorizationRequest::from(request))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        debug!(%status, "authorization backend answered");
        if !status.is_success() {
            return Err(AuthorizationFailure::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let decoded: AuthorizationResponse = serde_json::from_slice(&body)
            .map_err(|e| AuthorizationFailure::Decode(e.to_string()))?;
        Ok(decoded.status)
    }

    fn classify(&self, err: reqwest::Error) -> AuthorizationFailure {
        if err.is_timeout() {
            AuthorizationFailure::Timeout(self.timeout)
        } else {
            AuthorizationFailure::from(err)
        }
    }
}

#[async_trait]
impl Authorizer for HttpAuthorizer {
    async fn authorize(
        &self,
        request: &PaymentRequest,
    ) -> Result<AuthorizationVerdict, AuthorizationFailure> {
        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(AuthorizationFailure::Timeout(self.timeout)),
        }
    }
}
