//! Test Helpers

use rust_decimal::Decimal;
use sqlx::query;

use crate::test::TestContext;

/// Insert a quote owned by `email`. The quoting flow owns this table, so tests write it directly.
pub(crate) async fn insert_quote(
    ctx: &TestContext,
    quote_id: &str,
    email: &str,
) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO quotes (quote_id, email, full_name, quote_price, vehicle_reg, glass_type) \
         VALUES ($1, $2, 'Ada Lovelace', $3, 'AB12 CDE', 'windscreen')",
    )
    .bind(quote_id)
    .bind(email)
    .bind(Decimal::new(24_999, 2))
    .execute(ctx.db.pool())
    .await?;

    Ok(())
}

/// Reassign a quote to a different owner.
pub(crate) async fn change_quote_owner(
    ctx: &TestContext,
    quote_id: &str,
    email: &str,
) -> Result<(), sqlx::Error> {
    query("UPDATE quotes SET email = $2, updated_at = now() WHERE quote_id = $1")
        .bind(quote_id)
        .bind(email)
        .execute(ctx.db.pool())
        .await?;

    Ok(())
}

/// Pull the bearer string out of an access URL.
pub(crate) fn bearer_from_url(url: &str) -> Option<&str> {
    url.split_once("?token=").map(|(_, token)| token)
}
