//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    links::LinksConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    rate_limit::RateLimitConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod links;
pub(crate) mod observability;
pub(crate) mod rate_limit;
pub(crate) mod server;

/// Quotelink JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "quotelink-json", about = "Quotelink JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request observability settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Access link signing settings.
    #[command(flatten)]
    pub links: LinksConfig,

    /// Issuance rate limiting settings.
    #[command(flatten)]
    pub rate_limit: RateLimitConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn defaults_apply_when_only_required_values_are_given() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "quotelink-json",
            "--database-url",
            "postgres://localhost/quotes",
            "--link-signing-secret",
            SECRET,
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.links.public_base_url, "http://localhost:3000");
        assert_eq!(config.rate_limit.issue_rate_limit_max, 5);
        assert_eq!(config.rate_limit.issue_rate_limit_window_seconds, 900);
        assert_eq!(config.observability.slow_request_threshold_ms, 1_000);

        Ok(())
    }

    #[test]
    fn short_signing_secrets_are_rejected_by_the_key_builder() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "quotelink-json",
            "--database-url",
            "postgres://localhost/quotes",
            "--link-signing-secret",
            "too-short",
        ])?;

        assert!(
            config.links.link_settings().is_err(),
            "a nine byte secret must not build link settings"
        );

        Ok(())
    }
}
