//! Access Link Config

use clap::Args;

use quotelink_app::{
    domain::access_links::LinkSettings,
    tokens::{SigningKey, SigningKeyError},
};

/// Access link signing settings.
#[derive(Args)]
pub struct LinksConfig {
    /// Shared HMAC secret for link tokens (at least 32 bytes)
    #[arg(long, env = "LINK_SIGNING_SECRET", hide_env_values = true)]
    pub link_signing_secret: String,

    /// Public base URL that issued links point at
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:3000")]
    pub public_base_url: String,
}

impl LinksConfig {
    /// Build link settings, validating the signing secret.
    ///
    /// # Errors
    ///
    /// Returns an error when the secret is shorter than the minimum key length.
    pub fn link_settings(&self) -> Result<LinkSettings, SigningKeyError> {
        let key = SigningKey::new(self.link_signing_secret.clone().into_bytes())?;

        Ok(LinkSettings::new(key, &self.public_base_url))
    }
}

impl std::fmt::Debug for LinksConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinksConfig")
            .field("link_signing_secret", &"<redacted>")
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}
