use super::payment::{Amount, last4};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// How much of the derivation timestamp goes into a payment identifier.
///
/// `Nanos` makes every derivation unique; `Date` makes identifiers
/// reproducible within a calendar day at the cost of colliding for the same
/// card and amount on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdGranularity {
    #[default]
    Nanos,
    Date,
}

impl IdGranularity {
    fn stamp(&self, at: DateTime<Utc>) -> String {
        match self {
            Self::Nanos => at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            Self::Date => at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Derives the identifier of a payment from its card, amount and derivation time.
///
/// The last four card digits, the two-decimal amount and the timestamp are
/// hashed with SHA-256 and the digest is turned into a name-based (v5) UUID,
/// so equal inputs always give the same identifier.
pub fn derive_payment_id(
    card_number: &str,
    amount: &Amount,
    at: DateTime<Utc>,
    granularity: IdGranularity,
) -> Uuid {
    let material = format!(
        "{}:{}:{}",
        last4(card_number),
        amount.canonical(),
        granularity.stamp(at)
    );

    let digest = Sha256::digest(material.as_bytes());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_same_inputs_give_same_id() {
        let amount = Amount::new(dec!(100.00)).unwrap();
        let a = derive_payment_id("4242424242424242", &amount, at(), IdGranularity::Nanos);
        let b = derive_payment_id("4242424242424242", &amount, at(), IdGranularity::Nanos);
        assert_eq!(a, b);
        assert_eq!(a.get_version_num(), 5);
    }

    #[test]
    fn test_different_instants_give_different_ids() {
        let amount = Amount::new(dec!(100.00)).unwrap();
        let a = derive_payment_id("4242424242424242", &amount, at(), IdGranularity::Nanos);
        let b = derive_payment_id(
            "4242424242424242",
            &amount,
            at() + TimeDelta::nanoseconds(1),
            IdGranularity::Nanos,
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_date_granularity_is_stable_within_a_day() {
        let amount = Amount::new(dec!(100.00)).unwrap();
        let morning = derive_payment_id("4242424242424242", &amount, at(), IdGranularity::Date);
        let evening = derive_payment_id(
            "4242424242424242",
            &amount,
            at() + TimeDelta::hours(8),
            IdGranularity::Date,
        );
        let next_day = derive_payment_id(
            "4242424242424242",
            &amount,
            at() + TimeDelta::days(1),
            IdGranularity::Date,
        );
        assert_eq!(morning, evening);
        assert_ne!(morning, next_day);
    }

    #[test]
    fn test_amount_representation_does_not_change_id() {
        let a = derive_payment_id(
            "4242",
            &Amount::new(dec!(100)).unwrap(),
            at(),
            IdGranularity::Nanos,
        );
        let b = derive_payment_id(
            "4242",
            &Amount::new(dec!(100.000)).unwrap(),
            at(),
            IdGranularity::Nanos,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_only_last_four_digits_contribute() {
        let amount = Amount::new(dec!(9.99)).unwrap();
        let a = derive_payment_id("4000000000004242", &amount, at(), IdGranularity::Nanos);
        let b = derive_payment_id("5555555555554242", &amount, at(), IdGranularity::Nanos);
        assert_eq!(a, b);
    }
}
