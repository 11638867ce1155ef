//! Get Permanent Link Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use quotelink_app::tokens::TokenKind;

use crate::{
    extensions::*,
    links::{errors::into_status_error, models::quote_price},
    state::State,
};

use super::{record_issued, redirect};

/// Query value selecting a JSON answer instead of a redirect.
const JSON_FORMAT: &str = "json";

/// Permanent Link Lookup Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PermanentLinkLookupResponse {
    pub success: bool,
    pub permanent_magic_link: String,
    pub quote_id: String,
    pub email: String,
    pub quote_name: Option<String>,
    pub quote_price: Option<f64>,
}

/// Get Permanent Link Handler
///
/// Issues the owner's permanent link from query parameters, for email
/// templates and support tooling. Takes `quoteId`, `email` and an optional
/// `format`; with `format=json` the link is returned as JSON, otherwise the
/// caller is redirected to it.
#[endpoint(
    tags("links"),
    summary = "Get Permanent Link",
    responses(
        (status_code = StatusCode::OK, description = "Permanent link issued (format=json)"),
        (status_code = StatusCode::FOUND, description = "Redirect to the permanent link"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing or invalid quote ID or email"),
        (status_code = StatusCode::NOT_FOUND, description = "No quote for this quote ID and email"),
        (status_code = StatusCode::TOO_MANY_REQUESTS, description = "Rate limit exceeded"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Issuance failed, retry"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let quote_id = req.query::<String>("quoteId").unwrap_or_default();
    let email = req.query::<String>("email").unwrap_or_default();
    let wants_json = req.query::<String>("format").as_deref() == Some(JSON_FORMAT);

    let link = state
        .links
        .issue_permanent(&quote_id, &email, Timestamp::now())
        .await
        .map_err(|error| into_status_error(TokenKind::PermanentAccess, error))?;

    record_issued(&link);

    if !wants_json {
        return redirect(res, &link.url);
    }

    res.render(Json(PermanentLinkLookupResponse {
        success: true,
        quote_price: quote_price(&link.quote),
        permanent_magic_link: link.url,
        quote_id: link.quote.quote_id,
        email: link.quote.email,
        quote_name: link.quote.full_name,
    }));

    Ok(())
}
