//! Link issuance settings.

use crate::tokens::SigningKey;

/// Path that redeems ephemeral links.
pub const EPHEMERAL_LINK_PATH: &str = "/api/verify-magic-link";

/// Landing page that redeems permanent links.
pub const PERMANENT_LINK_PATH: &str = "/quote-access";

#[derive(Debug, Clone)]
pub struct LinkSettings {
    pub signing_key: SigningKey,

    /// Deployment origin, without a trailing slash.
    pub public_base_url: String,
}

impl LinkSettings {
    #[must_use]
    pub fn new(signing_key: SigningKey, public_base_url: &str) -> Self {
        Self {
            signing_key,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}
