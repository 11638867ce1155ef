//! Access Link Errors

use salvo::http::StatusError;
use tracing::{error, info, warn};

use quotelink_app::{
    domain::access_links::AccessLinksServiceError,
    tokens::{TokenError, TokenKind},
};

use crate::observability::observe_link_outcome;

/// Uniform message for every token that fails a cryptographic or lifecycle gate.
pub(crate) const INVALID_TOKEN: &str = "Invalid or expired token";

/// Message for revoked or replaced permanent links.
pub(crate) const LINK_DISABLED: &str = "This link has been disabled";

pub(crate) const QUOTE_NOT_FOUND: &str = "Quote not found";

/// Record the failed outcome and map it to its HTTP status.
///
/// Token failures share one message so a caller cannot tell which gate
/// rejected them. Bearer strings are never logged.
pub(crate) fn into_status_error(kind: TokenKind, error: AccessLinksServiceError) -> StatusError {
    let variant = kind.variant();
    let outcome = error.outcome();

    observe_link_outcome(variant, outcome);

    match error {
        AccessLinksServiceError::Validation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        AccessLinksServiceError::NotFound => {
            info!(variant, outcome, "no quote for owner pair");

            StatusError::not_found().brief(QUOTE_NOT_FOUND)
        }
        AccessLinksServiceError::Token(TokenError::Encoding) => {
            error!(variant, "failed to seal access link claims");

            StatusError::internal_server_error()
        }
        AccessLinksServiceError::Token(_)
        | AccessLinksServiceError::Unrecognised
        | AccessLinksServiceError::AlreadyUsed
        | AccessLinksServiceError::OwnerMismatch => {
            info!(variant, outcome, "access link rejected");

            StatusError::unauthorized().brief(INVALID_TOKEN)
        }
        AccessLinksServiceError::Deactivated | AccessLinksServiceError::Superseded => {
            info!(variant, outcome, "disabled access link presented");

            StatusError::unauthorized().brief(LINK_DISABLED)
        }
        AccessLinksServiceError::IssuanceFailed => {
            warn!(variant, "could not allocate a unique token id");

            StatusError::service_unavailable().brief("Could not issue a link, please retry")
        }
        AccessLinksServiceError::Sql(source) => {
            error!(variant, "access link storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
