//! Test context for service-level integration tests.

use std::sync::Arc;

use crate::{
    domain::{
        access_links::{LinkSettings, PgAccessLinksService, repository::PgDescriptorStore},
        quotes::PgQuotesService,
    },
    tokens::{MIN_SIGNING_KEY_BYTES, SigningKey},
};

use super::db::TestDb;

pub(crate) const TEST_BASE_URL: &str = "https://quotes.example.com";

pub(crate) struct TestContext {
    pub(crate) db: TestDb,
    pub(crate) quotes: PgQuotesService,
    pub(crate) descriptors: PgDescriptorStore,
    pub(crate) links: Arc<PgAccessLinksService>,
}

impl TestContext {
    pub(crate) async fn new() -> Self {
        let db = TestDb::new().await;
        let pool = db.pool().clone();

        let key = SigningKey::new(vec![42; MIN_SIGNING_KEY_BYTES])
            .expect("test signing key should be accepted");

        Self {
            quotes: PgQuotesService::new(pool.clone()),
            descriptors: PgDescriptorStore::new(pool.clone()),
            links: Arc::new(PgAccessLinksService::new(
                pool,
                LinkSettings::new(key, TEST_BASE_URL),
            )),
            db,
        }
    }
}
