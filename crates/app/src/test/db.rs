//! Per-test `PostgreSQL` databases in one shared container.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};
use uuid::Uuid;

const USER: &str = "quotelink_test";
const PASSWORD: &str = "quotelink_test_password";

static CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

/// Databases queued for dropping once their `TestDb` goes out of scope.
static DROP_QUEUE: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn start_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name("quotelink_test")
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("postgres container should start")
}

async fn start_drop_worker() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(name) = receiver.recv().await {
            if let Err(error) = drop_database(&name).await {
                eprintln!("failed to drop test database {name}: {error}");
            }
        }
    });

    sender
}

async fn server_url(database: &str) -> String {
    let container = CONTAINER.get_or_init(start_container).await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container should expose 5432");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{USER}:{PASSWORD}@{host}:{port}/{database}")
}

async fn drop_database(name: &str) -> Result<(), sqlx::Error> {
    if !is_generated_name(name) {
        return Ok(());
    }

    let mut conn = PgConnection::connect(&server_url("postgres").await).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{name}\""))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// Names are interpolated into DDL, so only ones this module generated are accepted.
fn is_generated_name(name: &str) -> bool {
    name.strip_prefix("quotelink_")
        .is_some_and(|rest| rest.len() == 32 && rest.chars().all(|c| c.is_ascii_hexdigit()))
}

/// An isolated, migrated database dropped when the value is dropped.
#[derive(Debug)]
pub(crate) struct TestDb {
    pool: PgPool,
    name: String,
}

impl TestDb {
    pub(crate) async fn new() -> Self {
        let _worker = DROP_QUEUE.get_or_init(start_drop_worker).await;

        let name = format!("quotelink_{}", Uuid::new_v4().simple());

        let mut conn = PgConnection::connect(&server_url("postgres").await)
            .await
            .expect("admin connection should open");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .await
            .expect("test database should be created");

        conn.close().await.expect("admin connection should close");

        let pool = PgPool::connect(&server_url(&name).await)
            .await
            .expect("test pool should connect");

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("migrations should apply");

        Self { pool, name }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = DROP_QUEUE.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_generated_names_are_dropped() {
        let generated = format!("quotelink_{}", Uuid::new_v4().simple());

        assert!(is_generated_name(&generated));
        assert!(!is_generated_name("postgres"));
        assert!(!is_generated_name("quotelink_x\"; DROP TABLE quotes; --"));
    }

    #[tokio::test]
    async fn databases_are_migrated() {
        let db = TestDb::new().await;

        let tables: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM information_schema.tables \
             WHERE table_name IN ('quotes', 'magic_links', 'permanent_magic_links')",
        )
        .fetch_one(db.pool())
        .await
        .expect("catalog query should run");

        assert_eq!(tables, 3);
    }
}
