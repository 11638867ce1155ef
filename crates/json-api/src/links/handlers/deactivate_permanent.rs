//! Deactivate Permanent Magic Link Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use quotelink_app::tokens::TokenKind;

use crate::{
    extensions::*,
    links::{errors::into_status_error, models::OwnerRequest},
    observability::observe_link_outcome,
    state::State,
};

/// Deactivation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeactivatedResponse {
    pub success: bool,
    pub quote_id: String,
    pub email: String,

    /// Number of active links switched off
    pub deactivated: u64,
}

/// Deactivate Permanent Magic Link Handler
///
/// Switches off the owner's permanent links. Deactivated links stay on
/// record and fail verification from then on.
#[endpoint(
    tags("links"),
    summary = "Deactivate Permanent Magic Link",
    responses(
        (status_code = StatusCode::OK, description = "Links deactivated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing or invalid quote ID or email"),
        (status_code = StatusCode::NOT_FOUND, description = "No quote for this quote ID and email"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<OwnerRequest>,
    depot: &mut Depot,
) -> Result<Json<DeactivatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let deactivated = state
        .links
        .deactivate_permanent(request.quote_id(), request.email(), Timestamp::now())
        .await
        .map_err(|error| into_status_error(TokenKind::PermanentAccess, error))?;

    observe_link_outcome(TokenKind::PermanentAccess.variant(), "deactivated_by_owner");

    info!(deactivated, "permanent links deactivated");

    Ok(Json(DeactivatedResponse {
        success: true,
        quote_id: request.quote_id().trim().to_string(),
        email: request.email().trim().to_string(),
        deactivated,
    }))
}
