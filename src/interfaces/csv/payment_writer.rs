use crate::domain::payment::PaymentView;
use crate::error::Result;
use std::io::Write;

/// Writes masked payment views as CSV.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header and one row per payment, then flushes.
    pub fn write_payments<I>(&mut self, payments: I) -> Result<()>
    where
        I: IntoIterator<Item = PaymentView>,
    {
        self.writer.write_record([
            "payment_id",
            "card_number",
            "expiry_month",
            "expiry_year",
            "amount",
            "currency",
            "status",
        ])?;
        for payment in payments {
            self.writer.write_record([
                payment.payment_id.to_string(),
                payment.card_number,
                payment.expiry_month,
                payment.expiry_year,
                format!("{:.2}", payment.amount),
                payment.currency,
                payment.status.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::AuthorizationVerdict;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_writes_header_and_masked_rows() {
        let view = PaymentView {
            payment_id: Uuid::nil(),
            card_number: "**** **** **** 4242".to_string(),
            expiry_month: "12".to_string(),
            expiry_year: "2024".to_string(),
            amount: dec!(100),
            currency: "USD".to_string(),
            status: AuthorizationVerdict::Approved,
            created_at: Utc::now(),
        };

        let mut out = Vec::new();
        PaymentWriter::new(&mut out).write_payments([view]).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("payment_id,card_number,expiry_month,expiry_year,amount,currency,status")
        );
        assert_eq!(
            lines.next(),
            Some("00000000-0000-0000-0000-000000000000,**** **** **** 4242,12,2024,100.00,USD,APPROVED")
        );
        assert_eq!(lines.next(), None);
    }
}
