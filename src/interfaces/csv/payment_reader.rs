use crate::domain::payment::PaymentRequest;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads payment requests from a CSV source.
///
/// Expected header: `card_number,expiry_month,expiry_year,cvv,amount,currency`.
/// Whitespace around fields is trimmed.
pub struct PaymentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes one request per row.
    pub fn requests(self) -> impl Iterator<Item = Result<PaymentRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}
