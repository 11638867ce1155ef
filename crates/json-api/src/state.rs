//! State

use std::sync::Arc;

use quotelink_app::{context::AppContext, domain::access_links::AccessLinksService};

/// Shared handler state injected into the depot.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) links: Arc<dyn AccessLinksService>,
}

impl State {
    #[must_use]
    pub(crate) fn new(links: Arc<dyn AccessLinksService>) -> Self {
        Self { links }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self::new(app.links))
    }
}
