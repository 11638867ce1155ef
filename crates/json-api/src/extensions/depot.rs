//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use tracing::error;

/// Typed depot lookups that fail as HTTP errors.
pub(crate) trait DepotExt {
    /// Fetch injected state, or a 500 when the router was wired without it.
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>().map_err(|_missing| {
            error!(
                "depot has no value of type {}",
                std::any::type_name::<T>()
            );

            StatusError::internal_server_error()
        })
    }
}
