//! Fixed-window rate limiting for link issuance.
//!
//! Counters live in process memory, keyed by client IP and route path. A
//! window opens on the first request from a key and resets once its length
//! has passed; stale windows are pruned lazily while serving requests.

use std::sync::{Mutex, PoisonError};

use jiff::{SignedDuration, Timestamp};
use rustc_hash::FxHashMap;
use salvo::{
    http::header::{HeaderValue, RETRY_AFTER},
    prelude::*,
};
use tracing::warn;

use crate::config::rate_limit::RateLimitConfig;

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Key used when neither a forwarded address nor a peer address is known.
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    count: u32,
    resets_at: Timestamp,
}

/// Result of counting one request against its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Decision {
    pub(crate) allowed: bool,
    pub(crate) limit: u32,
    pub(crate) remaining: u32,
    pub(crate) resets_at: Timestamp,

    /// Whole seconds until the window resets, rounded up.
    pub(crate) retry_after_secs: i64,
}

#[derive(Debug)]
struct Windows {
    by_key: FxHashMap<String, Window>,
    next_prune_at: Timestamp,
}

/// Issuance limiter, mounted as a hoop in front of the issuance routes.
#[derive(Debug)]
pub(crate) struct IssueRateLimiter {
    limit: u32,
    window: SignedDuration,
    windows: Mutex<Windows>,
}

impl IssueRateLimiter {
    pub(crate) fn new(limit: u32, window: SignedDuration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(Windows {
                by_key: FxHashMap::default(),
                next_prune_at: Timestamp::MIN,
            }),
        }
    }

    pub(crate) fn from_config(config: &RateLimitConfig) -> Self {
        let seconds = i64::try_from(config.issue_rate_limit_window_seconds).unwrap_or(i64::MAX);

        Self::new(config.issue_rate_limit_max, SignedDuration::from_secs(seconds))
    }

    /// Count a request for `key` at `now`.
    pub(crate) fn check(&self, key: &str, now: Timestamp) -> Decision {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if now >= windows.next_prune_at {
            windows.by_key.retain(|_, window| window.resets_at > now);
            windows.next_prune_at = now.saturating_add(self.window).unwrap_or(Timestamp::MAX);
        }

        let window = windows
            .by_key
            .entry(key.to_owned())
            .and_modify(|window| {
                if window.resets_at <= now {
                    *window = self.fresh_window(now);
                } else {
                    window.count = window.count.saturating_add(1);
                }
            })
            .or_insert_with(|| self.fresh_window(now));

        let retry_after = window.resets_at.duration_since(now);
        let retry_after_secs = if retry_after.subsec_nanos() > 0 {
            retry_after.as_secs().saturating_add(1)
        } else {
            retry_after.as_secs()
        };

        Decision {
            allowed: window.count <= self.limit,
            limit: self.limit,
            remaining: self.limit.saturating_sub(window.count),
            resets_at: window.resets_at,
            retry_after_secs,
        }
    }

    fn fresh_window(&self, now: Timestamp) -> Window {
        Window {
            count: 1,
            resets_at: now.saturating_add(self.window).unwrap_or(Timestamp::MAX),
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_key
            .len()
    }
}

#[handler]
impl IssueRateLimiter {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        let key = format!("{}:{}", client_ip(req), req.uri().path());
        let decision = self.check(&key, Timestamp::now());

        set_rate_limit_headers(res, &decision);

        if !decision.allowed {
            warn!(path = %req.uri().path(), "issuance rate limit exceeded");

            res.headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(decision.retry_after_secs));
            res.render(StatusError::too_many_requests().brief("Too many requests"));
            ctrl.skip_rest();

            return;
        }

        ctrl.call_next(req, depot, res).await;
    }
}

/// First `X-Forwarded-For` hop, else the peer address.
fn client_ip(req: &Request) -> String {
    let forwarded = req
        .header::<String>(FORWARDED_FOR_HEADER)
        .and_then(|value| {
            value
                .split(',')
                .next()
                .map(str::trim)
                .filter(|hop| !hop.is_empty())
                .map(str::to_owned)
        });

    forwarded
        .or_else(|| {
            let peer = req.remote_addr();

            peer.as_ipv4()
                .map(|addr| addr.ip().to_string())
                .or_else(|| peer.as_ipv6().map(|addr| addr.ip().to_string()))
        })
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
}

fn set_rate_limit_headers(res: &mut Response, decision: &Decision) {
    res.headers_mut()
        .insert(LIMIT_HEADER, HeaderValue::from(decision.limit));
    res.headers_mut()
        .insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));

    match HeaderValue::from_str(&decision.resets_at.to_string()) {
        Ok(value) => {
            res.headers_mut().insert(RESET_HEADER, value);
        }
        Err(source) => warn!("could not encode rate limit reset header: {source}"),
    }
}
