//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database,
    domain::access_links::{AccessLinksService, LinkSettings, PgAccessLinksService},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub links: Arc<dyn AccessLinksService>,
}

impl AppContext {
    /// Build application context from a database URL and link settings.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, settings: LinkSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self {
            links: Arc::new(PgAccessLinksService::new(pool, settings)),
        })
    }
}
