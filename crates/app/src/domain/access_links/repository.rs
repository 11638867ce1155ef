//! Access Link Descriptor Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{PgPool, Row, postgres::PgRow, query, query_scalar};
use uuid::Uuid;

use crate::{
    domain::access_links::{
        data::NewDescriptor,
        records::{AccessLinkDescriptor, DescriptorStatus},
    },
    tokens::TokenKind,
};

const INSERT_MAGIC_LINK_SQL: &str = include_str!("sql/insert_magic_link.sql");
const UPSERT_PERMANENT_MAGIC_LINK_SQL: &str = include_str!("sql/upsert_permanent_magic_link.sql");
const FIND_MAGIC_LINK_SQL: &str = include_str!("sql/find_magic_link.sql");
const FIND_PERMANENT_MAGIC_LINK_SQL: &str = include_str!("sql/find_permanent_magic_link.sql");
const PERMANENT_MAGIC_LINK_EXISTS_SQL: &str = include_str!("sql/permanent_magic_link_exists.sql");
const CONSUME_MAGIC_LINK_SQL: &str = include_str!("sql/consume_magic_link.sql");
const TOUCH_PERMANENT_MAGIC_LINK_SQL: &str = include_str!("sql/touch_permanent_magic_link.sql");
const DEACTIVATE_PERMANENT_MAGIC_LINKS_SQL: &str =
    include_str!("sql/deactivate_permanent_magic_links.sql");
const LIST_MAGIC_LINKS_SQL: &str = include_str!("sql/list_magic_links.sql");
const LIST_PERMANENT_MAGIC_LINKS_SQL: &str = include_str!("sql/list_permanent_magic_links.sql");

/// Persistence for token descriptors.
#[automock]
#[async_trait]
pub trait DescriptorStore: Send + Sync {
    /// Record an issuance. Ephemeral descriptors are inserted; permanent ones
    /// are upserted on `(quoteId, email)`, replacing any earlier token.
    async fn record(&self, kind: TokenKind, descriptor: &NewDescriptor) -> Result<(), sqlx::Error>;

    async fn find(
        &self,
        kind: TokenKind,
        token_id: Uuid,
    ) -> Result<Option<AccessLinkDescriptor>, sqlx::Error>;

    /// Whether any permanent descriptor exists for the pair.
    async fn permanent_exists(&self, quote_id: &str, email: &str) -> Result<bool, sqlx::Error>;

    /// Flip `used` from false to true. Returns `false` if another redemption got there first.
    async fn consume(&self, token_id: Uuid, at: Timestamp) -> Result<bool, sqlx::Error>;

    /// Stamp `lastAccessedAt` on an active permanent descriptor. Returns `false`
    /// if the descriptor is no longer active.
    async fn touch(&self, token_id: Uuid, at: Timestamp) -> Result<bool, sqlx::Error>;

    /// Deactivate every active permanent descriptor for the pair, returning how many changed.
    async fn deactivate(
        &self,
        quote_id: &str,
        email: &str,
        at: Timestamp,
    ) -> Result<u64, sqlx::Error>;

    /// All descriptors of both kinds for the pair, newest first.
    async fn list(
        &self,
        quote_id: &str,
        email: &str,
    ) -> Result<Vec<AccessLinkDescriptor>, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgDescriptorStore {
    pool: PgPool,
}

impl PgDescriptorStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DescriptorStore for PgDescriptorStore {
    async fn record(&self, kind: TokenKind, descriptor: &NewDescriptor) -> Result<(), sqlx::Error> {
        let statement = match kind {
            TokenKind::EphemeralAccess => query(INSERT_MAGIC_LINK_SQL)
                .bind(descriptor.token_id)
                .bind(&descriptor.quote_id)
                .bind(&descriptor.email)
                .bind(&descriptor.token_hash)
                .bind(descriptor.expires_at.map(SqlxTimestamp::from))
                .bind(SqlxTimestamp::from(descriptor.created_at)),
            TokenKind::PermanentAccess => query(UPSERT_PERMANENT_MAGIC_LINK_SQL)
                .bind(descriptor.token_id)
                .bind(&descriptor.quote_id)
                .bind(&descriptor.email)
                .bind(&descriptor.token_hash)
                .bind(&descriptor.purpose)
                .bind(SqlxTimestamp::from(descriptor.created_at)),
        };

        statement.execute(&self.pool).await?;

        Ok(())
    }

    async fn find(
        &self,
        kind: TokenKind,
        token_id: Uuid,
    ) -> Result<Option<AccessLinkDescriptor>, sqlx::Error> {
        let sql = match kind {
            TokenKind::EphemeralAccess => FIND_MAGIC_LINK_SQL,
            TokenKind::PermanentAccess => FIND_PERMANENT_MAGIC_LINK_SQL,
        };

        query(sql)
            .bind(token_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| descriptor_from_row(kind, &row))
            .transpose()
    }

    async fn permanent_exists(&self, quote_id: &str, email: &str) -> Result<bool, sqlx::Error> {
        query_scalar(PERMANENT_MAGIC_LINK_EXISTS_SQL)
            .bind(quote_id)
            .bind(email)
            .fetch_one(&self.pool)
            .await
    }

    async fn consume(&self, token_id: Uuid, at: Timestamp) -> Result<bool, sqlx::Error> {
        let rows_affected = query(CONSUME_MAGIC_LINK_SQL)
            .bind(token_id)
            .bind(SqlxTimestamp::from(at))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn touch(&self, token_id: Uuid, at: Timestamp) -> Result<bool, sqlx::Error> {
        let rows_affected = query(TOUCH_PERMANENT_MAGIC_LINK_SQL)
            .bind(token_id)
            .bind(SqlxTimestamp::from(at))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn deactivate(
        &self,
        quote_id: &str,
        email: &str,
        at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DEACTIVATE_PERMANENT_MAGIC_LINKS_SQL)
            .bind(quote_id)
            .bind(email)
            .bind(SqlxTimestamp::from(at))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn list(
        &self,
        quote_id: &str,
        email: &str,
    ) -> Result<Vec<AccessLinkDescriptor>, sqlx::Error> {
        let mut descriptors = Vec::new();

        for (kind, sql) in [
            (TokenKind::EphemeralAccess, LIST_MAGIC_LINKS_SQL),
            (TokenKind::PermanentAccess, LIST_PERMANENT_MAGIC_LINKS_SQL),
        ] {
            let rows = query(sql)
                .bind(quote_id)
                .bind(email)
                .fetch_all(&self.pool)
                .await?;

            for row in &rows {
                descriptors.push(descriptor_from_row(kind, row)?);
            }
        }

        descriptors.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(descriptors)
    }
}

fn descriptor_from_row(kind: TokenKind, row: &PgRow) -> sqlx::Result<AccessLinkDescriptor> {
    let status = match kind {
        TokenKind::EphemeralAccess => DescriptorStatus::Ephemeral {
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            used: row.try_get("used")?,
            used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("used_at")?
                .map(SqlxTimestamp::to_jiff),
        },
        TokenKind::PermanentAccess => DescriptorStatus::Permanent {
            purpose: row.try_get("purpose")?,
            is_active: row.try_get("is_active")?,
            deactivated_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deactivated_at")?
                .map(SqlxTimestamp::to_jiff),
            last_accessed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_accessed_at")?
                .map(SqlxTimestamp::to_jiff),
        },
    };

    Ok(AccessLinkDescriptor {
        token_id: row.try_get("token_id")?,
        quote_id: row.try_get("quote_id")?,
        email: row.try_get("email")?,
        token_hash: row.try_get("token_hash")?,
        created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        status,
    })
}
