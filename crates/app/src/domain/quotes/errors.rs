//! Quotes service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuotesServiceError {
    #[error("storage error")]
    Sql(#[from] Error),
}
