//! Verify Magic Link Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::extract::QueryParam, prelude::*};

use quotelink_app::tokens::TokenKind;

use crate::{extensions::*, links::errors::into_status_error, state::State};

use super::{record_redeemed, redirect};

/// Verify Magic Link Handler
///
/// Redeems a single-use link and redirects to the quote page. A link can be
/// redeemed once; every later attempt is rejected.
#[endpoint(
    tags("links"),
    summary = "Verify Magic Link",
    responses(
        (status_code = StatusCode::FOUND, description = "Redirect to the quote page"),
        (status_code = StatusCode::BAD_REQUEST, description = "Token is required"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid or expired token"),
        (status_code = StatusCode::NOT_FOUND, description = "Quote no longer exists"),
    ),
)]
pub(crate) async fn handler(
    token: QueryParam<String, false>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let bearer = token.into_inner().unwrap_or_default();

    let redemption = state
        .links
        .redeem_ephemeral(&bearer, Timestamp::now())
        .await
        .map_err(|error| into_status_error(TokenKind::EphemeralAccess, error))?;

    record_redeemed(&redemption);

    redirect(res, &format!("/quote/{}", redemption.claims.quote_id))
}
