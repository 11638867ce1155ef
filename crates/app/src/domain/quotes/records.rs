//! Quote Records

use jiff::Timestamp;
use rust_decimal::Decimal;

/// Delivery type assumed when a quote does not record one.
pub const DEFAULT_DELIVERY_TYPE: &str = "standard";

/// Quote Record
///
/// Owned by the quoting flow; this service only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRecord {
    pub quote_id: String,

    /// Owner email. Access links are only ever issued to this address.
    pub email: String,

    pub full_name: Option<String>,
    pub quote_price: Option<Decimal>,
    pub vehicle_reg: Option<String>,
    pub glass_type: Option<String>,
    pub delivery_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QuoteRecord {
    /// Delivery type, falling back to [`DEFAULT_DELIVERY_TYPE`].
    #[must_use]
    pub fn delivery_type_or_default(&self) -> &str {
        self.delivery_type.as_deref().unwrap_or(DEFAULT_DELIVERY_TYPE)
    }
}
