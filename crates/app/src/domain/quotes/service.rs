//! Quotes service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;

use crate::domain::quotes::{
    errors::QuotesServiceError, ownership::Ownership, records::QuoteRecord,
    repository::PgQuotesRepository,
};

#[derive(Debug, Clone)]
pub struct PgQuotesService {
    repository: PgQuotesRepository,
}

impl PgQuotesService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgQuotesRepository::new(pool),
        }
    }
}

#[async_trait]
impl QuotesService for PgQuotesService {
    async fn find_quote(&self, quote_id: &str) -> Result<Option<QuoteRecord>, QuotesServiceError> {
        self.repository
            .find_quote(quote_id)
            .await
            .map_err(Into::into)
    }

    async fn ownership(
        &self,
        quote_id: &str,
        email: &str,
    ) -> Result<Ownership, QuotesServiceError> {
        let quote = self.find_quote(quote_id).await?;

        Ok(Ownership::check(quote, email))
    }
}

#[automock]
#[async_trait]
/// Read access to quote records.
pub trait QuotesService: Send + Sync {
    /// Look up a quote by id.
    async fn find_quote(&self, quote_id: &str) -> Result<Option<QuoteRecord>, QuotesServiceError>;

    /// Check that `email` owns `quote_id`.
    async fn ownership(&self, quote_id: &str, email: &str)
    -> Result<Ownership, QuotesServiceError>;
}
