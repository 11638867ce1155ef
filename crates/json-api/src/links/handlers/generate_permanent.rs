//! Generate Permanent Magic Link Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quotelink_app::tokens::TokenKind;

use crate::{
    extensions::*,
    links::{
        errors::into_status_error,
        models::{OwnerRequest, quote_price},
    },
    state::State,
};

use super::record_issued;

/// Permanent Magic Link Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PermanentLinkResponse {
    pub success: bool,

    /// Reusable link to the quote access page
    pub permanent_magic_link: String,

    pub token_id: Uuid,
    pub quote_name: Option<String>,
    pub quote_price: Option<f64>,
}

/// Generate Permanent Magic Link Handler
///
/// Issues the owner's permanent link. Issuing again replaces the previous
/// link, which stops working.
#[endpoint(
    tags("links"),
    summary = "Generate Permanent Magic Link",
    responses(
        (status_code = StatusCode::OK, description = "Permanent link issued"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing or invalid quote ID or email"),
        (status_code = StatusCode::NOT_FOUND, description = "No quote for this quote ID and email"),
        (status_code = StatusCode::TOO_MANY_REQUESTS, description = "Rate limit exceeded"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Issuance failed, retry"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<OwnerRequest>,
    depot: &mut Depot,
) -> Result<Json<PermanentLinkResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let link = state
        .links
        .issue_permanent(request.quote_id(), request.email(), Timestamp::now())
        .await
        .map_err(|error| into_status_error(TokenKind::PermanentAccess, error))?;

    record_issued(&link);

    Ok(Json(PermanentLinkResponse {
        success: true,
        quote_price: quote_price(&link.quote),
        permanent_magic_link: link.url,
        token_id: link.token_id,
        quote_name: link.quote.full_name,
    }))
}
