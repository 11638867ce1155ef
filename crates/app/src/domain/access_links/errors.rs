//! Access links service errors.

use sqlx::Error;
use thiserror::Error;

use crate::{
    domain::{access_links::validation::ValidationError, quotes::QuotesServiceError},
    tokens::TokenError,
};

#[derive(Debug, Error)]
pub enum AccessLinksServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No live quote matches the `(quoteId, email)` pair.
    #[error("quote not found")]
    NotFound,

    #[error(transparent)]
    Token(#[from] TokenError),

    /// The bearer string does not hash to the descriptor recorded for its token id.
    #[error("token is not recognised")]
    Unrecognised,

    #[error("token has already been used")]
    AlreadyUsed,

    #[error("link has been deactivated")]
    Deactivated,

    /// A newer permanent link has replaced this one.
    #[error("link has been superseded")]
    Superseded,

    /// The quote now belongs to a different email than the token names.
    #[error("token owner does not match quote")]
    OwnerMismatch,

    /// Every issuance attempt collided with an existing token id.
    #[error("could not allocate a unique token id")]
    IssuanceFailed,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl AccessLinksServiceError {
    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_request",
            Self::NotFound => "not_found",
            Self::Token(TokenError::Malformed | TokenError::Encoding) => "malformed",
            Self::Token(TokenError::InvalidSignature) => "invalid_signature",
            Self::Token(TokenError::Expired) => "expired",
            Self::Token(TokenError::WrongType) => "wrong_type",
            Self::Unrecognised => "unrecognised",
            Self::AlreadyUsed => "already_used",
            Self::Deactivated => "deactivated",
            Self::Superseded => "superseded",
            Self::OwnerMismatch => "owner_mismatch",
            Self::IssuanceFailed => "issuance_failed",
            Self::Sql(_) => "storage_error",
        }
    }
}

impl From<Error> for AccessLinksServiceError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}

impl From<QuotesServiceError> for AccessLinksServiceError {
    fn from(error: QuotesServiceError) -> Self {
        match error {
            QuotesServiceError::Sql(source) => Self::Sql(source),
        }
    }
}

/// Whether a storage error is a unique-key collision on insert.
pub(crate) fn is_unique_violation(error: &Error) -> bool {
    matches!(
        error.as_database_error().map(sqlx::error::DatabaseError::kind),
        Some(sqlx::error::ErrorKind::UniqueViolation)
    )
}
