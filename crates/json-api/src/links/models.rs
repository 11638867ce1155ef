//! Access Link Models

use rust_decimal::prelude::ToPrimitive as _;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use quotelink_app::domain::quotes::records::QuoteRecord;

/// Owner pair naming a quote and its customer.
///
/// Both fields are optional on the wire so that a missing field is reported
/// as a validation error rather than a body parse failure.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OwnerRequest {
    /// Quote identifier, e.g. `WIN123`
    pub quote_id: Option<String>,

    /// Email address the quote was issued to
    pub email: Option<String>,
}

impl OwnerRequest {
    pub(crate) fn quote_id(&self) -> &str {
        self.quote_id.as_deref().unwrap_or_default()
    }

    pub(crate) fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

/// Quote snapshot returned to a redeemed permanent link.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteData {
    pub quote_id: String,
    pub email: String,
    pub customer_name: Option<String>,
    pub quote_price: Option<f64>,
    pub vehicle_reg: Option<String>,
    pub glass_type: Option<String>,

    /// Falls back to `standard` when the quote records none.
    pub delivery_type: String,
}

impl From<&QuoteRecord> for QuoteData {
    fn from(quote: &QuoteRecord) -> Self {
        QuoteData {
            quote_id: quote.quote_id.clone(),
            email: quote.email.clone(),
            customer_name: quote.full_name.clone(),
            quote_price: quote_price(quote),
            vehicle_reg: quote.vehicle_reg.clone(),
            glass_type: quote.glass_type.clone(),
            delivery_type: quote.delivery_type_or_default().to_string(),
        }
    }
}

/// Quote price as a JSON number.
pub(crate) fn quote_price(quote: &QuoteRecord) -> Option<f64> {
    quote.quote_price.and_then(|price| price.to_f64())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::make_quote;

    use super::*;

    #[test]
    fn quote_data_serialises_in_camel_case_with_default_delivery() -> TestResult {
        let value = serde_json::to_value(QuoteData::from(&make_quote()))?;

        assert_eq!(
            value,
            json!({
                "quoteId": "WIN123",
                "email": "a@b.com",
                "customerName": "Ada Lovelace",
                "quotePrice": 249.99,
                "vehicleReg": "AB12 CDE",
                "glassType": "windscreen",
                "deliveryType": "standard",
            })
        );

        Ok(())
    }

    #[test]
    fn missing_owner_fields_read_as_empty() -> TestResult {
        let request: OwnerRequest = serde_json::from_value(json!({ "quoteId": "WIN123" }))?;

        assert_eq!(request.quote_id(), "WIN123");
        assert_eq!(request.email(), "");

        Ok(())
    }
}
