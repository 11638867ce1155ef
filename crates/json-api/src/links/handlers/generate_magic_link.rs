//! Generate Magic Link Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use quotelink_app::tokens::TokenKind;

use crate::{
    extensions::*,
    links::{errors::into_status_error, models::OwnerRequest},
    state::State,
};

use super::record_issued;

/// Magic Link Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MagicLinkResponse {
    pub success: bool,

    /// Single-use link that redeems to the quote page
    pub magic_link: String,

    /// RFC 3339 expiry, 24 hours after issuance
    pub expires_at: Option<String>,

    /// Customer name on the quote
    pub quote_name: Option<String>,
}

/// Generate Magic Link Handler
///
/// Issues a 24-hour, single-use link for the quote's owner.
#[endpoint(
    tags("links"),
    summary = "Generate Magic Link",
    responses(
        (status_code = StatusCode::OK, description = "Magic link issued"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing or invalid quote ID or email"),
        (status_code = StatusCode::NOT_FOUND, description = "No quote for this quote ID and email"),
        (status_code = StatusCode::TOO_MANY_REQUESTS, description = "Rate limit exceeded"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Issuance failed, retry"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<OwnerRequest>,
    depot: &mut Depot,
) -> Result<Json<MagicLinkResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let link = state
        .links
        .issue_ephemeral(request.quote_id(), request.email(), Timestamp::now())
        .await
        .map_err(|error| into_status_error(TokenKind::EphemeralAccess, error))?;

    record_issued(&link);

    Ok(Json(MagicLinkResponse {
        success: true,
        magic_link: link.url,
        expires_at: link.expires_at.map(|expires_at| expires_at.to_string()),
        quote_name: link.quote.full_name,
    }))
}
