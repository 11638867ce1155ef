//! Rate Limit Config

use clap::Args;

/// Issuance rate limiting settings.
#[derive(Debug, Args)]
pub struct RateLimitConfig {
    /// Issuance requests allowed per client and route within one window
    #[arg(long, env = "ISSUE_RATE_LIMIT_MAX", default_value_t = 5_u32)]
    pub issue_rate_limit_max: u32,

    /// Length of the issuance rate limit window in seconds
    #[arg(long, env = "ISSUE_RATE_LIMIT_WINDOW_SECONDS", default_value_t = 900_u64)]
    pub issue_rate_limit_window_seconds: u64,
}
