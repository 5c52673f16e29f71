use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Placeholder shown in place of every digit but the last four.
pub const CARD_MASK: &str = "**** **** **** ";

/// A strictly positive monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must be greater than zero".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Fixed two-decimal rendering used wherever the amount takes part in a key.
    pub fn canonical(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// An inbound card-payment request.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub amount: Decimal,
    pub currency: String,
}

impl PaymentRequest {
    /// Checks the structural preconditions and returns the validated amount.
    pub fn validate(&self) -> Result<Amount, PaymentError> {
        let required = [
            ("card_number", &self.card_number),
            ("expiry_month", &self.expiry_month),
            ("expiry_year", &self.expiry_year),
            ("cvv", &self.cvv),
            ("currency", &self.currency),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(PaymentError::ValidationError(format!(
                "Field '{field}' is required"
            )));
        }

        if self.card_number.len() < 4 || !self.card_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PaymentError::ValidationError(
                "Card number must contain at least four digits and nothing else".to_string(),
            ));
        }

        Amount::new(self.amount)
    }

    pub fn card_last4(&self) -> &str {
        last4(&self.card_number)
    }
}

// Card number and CVV never reach the logs.
impl fmt::Debug for PaymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentRequest")
            .field("card_number", &mask_card_number(&self.card_number))
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"***")
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .finish()
    }
}

/// The backend's approve/decline decision.
///
/// Serialized upper-case; parsed without regard to case so a backend that
/// answers `approved` is understood as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthorizationVerdict {
    Approved,
    Declined,
}

impl AuthorizationVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Declined => "DECLINED",
        }
    }
}

impl fmt::Display for AuthorizationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorizationVerdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("APPROVED") {
            Ok(Self::Approved)
        } else if s.eq_ignore_ascii_case("DECLINED") {
            Ok(Self::Declined)
        } else {
            Err(format!("unknown authorization status '{s}'"))
        }
    }
}

impl<'de> Deserialize<'de> for AuthorizationVerdict {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A recorded payment. Only the last four card digits are ever stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub card_last4: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: AuthorizationVerdict,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Builds the record for a request that received a verdict. The CVV is dropped here.
    pub fn authorized(
        id: Uuid,
        request: &PaymentRequest,
        amount: Amount,
        status: AuthorizationVerdict,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            card_last4: request.card_last4().to_string(),
            expiry_month: request.expiry_month.clone(),
            expiry_year: request.expiry_year.clone(),
            amount: amount.into(),
            currency: request.currency.clone(),
            status,
            created_at,
            updated_at: created_at,
            deleted_at: None,
        }
    }

    pub fn view(&self) -> PaymentView {
        PaymentView {
            payment_id: self.id,
            card_number: mask_card_number(&self.card_last4),
            expiry_month: self.expiry_month.clone(),
            expiry_year: self.expiry_year.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// What callers get back when they look a payment up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentView {
    pub payment_id: Uuid,
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub status: AuthorizationVerdict,
    pub created_at: DateTime<Utc>,
}

/// Identifier and verdict handed back once a payment has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub id: Uuid,
    pub status: AuthorizationVerdict,
}

pub(crate) fn last4(card_number: &str) -> &str {
    let start = card_number.len().saturating_sub(4);
    card_number.get(start..).unwrap_or_default()
}

/// Masks everything but the last four characters of `card_number`.
pub fn mask_card_number(card_number: &str) -> String {
    format!("{CARD_MASK}{}", last4(card_number))
}
