//! Quotes Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::domain::quotes::records::QuoteRecord;

const FIND_QUOTE_SQL: &str = include_str!("sql/find_quote.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgQuotesRepository {
    pool: PgPool,
}

impl PgQuotesRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn find_quote(
        &self,
        quote_id: &str,
    ) -> Result<Option<QuoteRecord>, sqlx::Error> {
        query_as::<Postgres, QuoteRecord>(FIND_QUOTE_SQL)
            .bind(quote_id)
            .fetch_optional(&self.pool)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for QuoteRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            quote_id: row.try_get("quote_id")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            quote_price: row.try_get("quote_price")?,
            vehicle_reg: row.try_get("vehicle_reg")?,
            glass_type: row.try_get("glass_type")?,
            delivery_type: row.try_get("delivery_type")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
