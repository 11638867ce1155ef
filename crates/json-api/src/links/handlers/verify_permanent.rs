//! Verify Permanent Magic Link Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use quotelink_app::tokens::TokenKind;

use crate::{
    extensions::*,
    links::{errors::into_status_error, models::QuoteData},
    state::State,
};

use super::record_redeemed;

/// Verified Permanent Link Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifiedResponse {
    pub success: bool,
    pub verified: bool,
    pub quote_data: QuoteData,
}

/// Verify Permanent Magic Link Handler
///
/// Redeems a permanent link and returns the quote it grants access to.
#[endpoint(
    tags("links"),
    summary = "Verify Permanent Magic Link",
    responses(
        (status_code = StatusCode::OK, description = "Link verified"),
        (status_code = StatusCode::BAD_REQUEST, description = "Token is required"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid token or disabled link"),
        (status_code = StatusCode::NOT_FOUND, description = "Quote no longer exists"),
    ),
)]
pub(crate) async fn handler(
    token: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<VerifiedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let bearer = token.into_inner().unwrap_or_default();

    let redemption = state
        .links
        .redeem_permanent(&bearer, Timestamp::now())
        .await
        .map_err(|error| into_status_error(TokenKind::PermanentAccess, error))?;

    record_redeemed(&redemption);

    Ok(Json(VerifiedResponse {
        success: true,
        verified: true,
        quote_data: QuoteData::from(&redemption.quote),
    }))
}
