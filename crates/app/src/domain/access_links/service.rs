//! Access links service.
//!
//! One issue/redeem engine drives both link variants; a [`TokenPolicy`]
//! selects expiry, consumption and revocation behaviour.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        access_links::{
            data::{IssuedLink, NewDescriptor, Redemption},
            errors::{AccessLinksServiceError, is_unique_violation},
            records::{AccessLinkDescriptor, DescriptorStatus},
            repository::{DescriptorStore, PgDescriptorStore},
            settings::{EPHEMERAL_LINK_PATH, LinkSettings, PERMANENT_LINK_PATH},
            validation::{OwnerPair, require_token},
        },
        quotes::{Ownership, PgQuotesService, QuotesService, records::QuoteRecord},
    },
    tokens::{
        BearerTokens, Hs256Tokens, TokenKind, TokenPolicy, TokenState, constant_time_eq,
        hash_bearer,
    },
};

/// Issuance attempts before giving up on token id collisions.
pub const MAX_ISSUANCE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct PgAccessLinksService {
    store: Arc<dyn DescriptorStore>,
    quotes: Arc<dyn QuotesService>,
    tokens: Arc<dyn BearerTokens>,
    public_base_url: String,
}

impl PgAccessLinksService {
    #[must_use]
    pub fn new(pool: PgPool, settings: LinkSettings) -> Self {
        Self {
            store: Arc::new(PgDescriptorStore::new(pool.clone())),
            quotes: Arc::new(PgQuotesService::new(pool)),
            tokens: Arc::new(Hs256Tokens::new(settings.signing_key)),
            public_base_url: settings.public_base_url,
        }
    }

    /// Assemble a service from explicit collaborators.
    #[must_use]
    pub fn from_parts(
        store: Arc<dyn DescriptorStore>,
        quotes: Arc<dyn QuotesService>,
        tokens: Arc<dyn BearerTokens>,
        public_base_url: &str,
    ) -> Self {
        Self {
            store,
            quotes,
            tokens,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn link_url(&self, kind: TokenKind, bearer: &str) -> String {
        let path = match kind {
            TokenKind::EphemeralAccess => EPHEMERAL_LINK_PATH,
            TokenKind::PermanentAccess => PERMANENT_LINK_PATH,
        };

        format!("{}{path}?token={bearer}", self.public_base_url)
    }

    async fn owned_quote(&self, owner: &OwnerPair) -> Result<QuoteRecord, AccessLinksServiceError> {
        self.quotes
            .ownership(&owner.quote_id, &owner.email)
            .await?
            .into_owned()
            .ok_or(AccessLinksServiceError::NotFound)
    }

    /// An untracked token for a pair that already has a permanent descriptor
    /// would redeem as superseded. Unknown counts as present.
    async fn pair_has_permanent_link(&self, owner: &OwnerPair) -> bool {
        match self
            .store
            .permanent_exists(&owner.quote_id, &owner.email)
            .await
        {
            Ok(exists) => exists,
            Err(error) => {
                warn!(error = %error, "could not check for an existing permanent descriptor");
                true
            }
        }
    }

    #[tracing::instrument(
        name = "access_links.issue",
        skip(self, policy, now),
        fields(variant = policy.kind.variant()),
        err
    )]
    async fn issue(
        &self,
        policy: TokenPolicy,
        quote_id: &str,
        email: &str,
        now: Timestamp,
    ) -> Result<IssuedLink, AccessLinksServiceError> {
        let owner = OwnerPair::parse(quote_id, email)?;
        let quote = self.owned_quote(&owner).await?;

        for attempt in 1..=MAX_ISSUANCE_ATTEMPTS {
            let token_id = Uuid::new_v4();
            let claims = policy.claims_for(&owner.quote_id, &owner.email, token_id, now);
            let bearer = self.tokens.seal(&claims)?;

            let descriptor = NewDescriptor {
                token_id,
                quote_id: owner.quote_id.clone(),
                email: owner.email.clone(),
                token_hash: hash_bearer(&bearer),
                created_at: now,
                expires_at: claims.expires_at_timestamp(),
                purpose: claims.purpose.clone(),
            };

            let tracked = match self.store.record(policy.kind, &descriptor).await {
                Ok(()) => true,
                Err(error) if is_unique_violation(&error) => {
                    warn!(%token_id, attempt, "token id collision during issuance");
                    continue;
                }
                Err(error) => {
                    if policy.revocable && self.pair_has_permanent_link(&owner).await {
                        error!(%token_id, error = %error, "failed to replace permanent descriptor");
                        return Err(AccessLinksServiceError::IssuanceFailed);
                    }

                    error!(%token_id, error = %error, "failed to record descriptor; link is untracked");
                    false
                }
            };

            info!(%token_id, tracked, "access link issued");

            return Ok(IssuedLink {
                kind: policy.kind,
                token_id,
                url: self.link_url(policy.kind, &bearer),
                expires_at: descriptor.expires_at,
                tracked,
                quote,
            });
        }

        Err(AccessLinksServiceError::IssuanceFailed)
    }

    #[tracing::instrument(
        name = "access_links.redeem",
        skip(self, policy, bearer, now),
        fields(variant = policy.kind.variant(), token_id = tracing::field::Empty),
        err
    )]
    async fn redeem(
        &self,
        policy: TokenPolicy,
        bearer: &str,
        now: Timestamp,
    ) -> Result<Redemption, AccessLinksServiceError> {
        let bearer = require_token(bearer)?;
        let claims = self.tokens.open(bearer)?;

        tracing::Span::current().record("token_id", tracing::field::display(claims.token_id));

        policy.check_claims(&claims, now)?;

        let descriptor = self.store.find(policy.kind, claims.token_id).await?;

        let tracked = match descriptor {
            Some(descriptor) => {
                check_descriptor(&policy, &descriptor, bearer)?;
                true
            }
            None => {
                if policy.revocable
                    && self
                        .store
                        .permanent_exists(&claims.quote_id, &claims.email)
                        .await?
                {
                    return Err(AccessLinksServiceError::Superseded);
                }

                warn!(token_id = %claims.token_id, "no descriptor on record; redeeming untracked token");
                false
            }
        };

        let quote = match self.quotes.ownership(&claims.quote_id, &claims.email).await? {
            Ownership::Owned(quote) => quote,
            Ownership::Missing => return Err(AccessLinksServiceError::NotFound),
            Ownership::Mismatch => return Err(AccessLinksServiceError::OwnerMismatch),
        };

        let state = if tracked {
            self.settle(&policy, claims.token_id, now).await?
        } else {
            TokenState::Untracked
        };

        info!(token_id = %claims.token_id, state = state.as_str(), "access link redeemed");

        Ok(Redemption {
            claims,
            quote,
            state,
        })
    }

    /// Apply the post-verification transition: consume single-use tokens, stamp revocable ones.
    async fn settle(
        &self,
        policy: &TokenPolicy,
        token_id: Uuid,
        now: Timestamp,
    ) -> Result<TokenState, AccessLinksServiceError> {
        if policy.single_use {
            return match self.store.consume(token_id, now).await {
                Ok(true) => Ok(TokenState::Consumed),
                Ok(false) => Err(AccessLinksServiceError::AlreadyUsed),
                Err(error) => {
                    error!(%token_id, error = %error, "failed to consume descriptor; granting access");
                    Ok(TokenState::Issued)
                }
            };
        }

        if policy.revocable {
            return match self.store.touch(token_id, now).await {
                Ok(true) => Ok(TokenState::Issued),
                Ok(false) => Err(AccessLinksServiceError::Deactivated),
                Err(error) => {
                    error!(%token_id, error = %error, "failed to stamp last access; granting access");
                    Ok(TokenState::Issued)
                }
            };
        }

        Ok(TokenState::Issued)
    }
}

/// Descriptor gates: the bearer must hash to the recorded value and the
/// descriptor must still be redeemable under `policy`.
fn check_descriptor(
    policy: &TokenPolicy,
    descriptor: &AccessLinkDescriptor,
    bearer: &str,
) -> Result<(), AccessLinksServiceError> {
    let presented = hash_bearer(bearer);

    if !constant_time_eq(presented.as_bytes(), descriptor.token_hash.as_bytes()) {
        return Err(AccessLinksServiceError::Unrecognised);
    }

    match &descriptor.status {
        DescriptorStatus::Ephemeral { used: true, .. } if policy.single_use => {
            Err(AccessLinksServiceError::AlreadyUsed)
        }
        DescriptorStatus::Permanent {
            is_active: false, ..
        } if policy.revocable => Err(AccessLinksServiceError::Deactivated),
        DescriptorStatus::Ephemeral { .. } | DescriptorStatus::Permanent { .. } => Ok(()),
    }
}

#[async_trait]
impl AccessLinksService for PgAccessLinksService {
    async fn issue_ephemeral(
        &self,
        quote_id: &str,
        email: &str,
        now: Timestamp,
    ) -> Result<IssuedLink, AccessLinksServiceError> {
        self.issue(TokenPolicy::EPHEMERAL, quote_id, email, now)
            .await
    }

    async fn redeem_ephemeral(
        &self,
        bearer: &str,
        now: Timestamp,
    ) -> Result<Redemption, AccessLinksServiceError> {
        self.redeem(TokenPolicy::EPHEMERAL, bearer, now).await
    }

    async fn issue_permanent(
        &self,
        quote_id: &str,
        email: &str,
        now: Timestamp,
    ) -> Result<IssuedLink, AccessLinksServiceError> {
        self.issue(TokenPolicy::PERMANENT, quote_id, email, now)
            .await
    }

    async fn redeem_permanent(
        &self,
        bearer: &str,
        now: Timestamp,
    ) -> Result<Redemption, AccessLinksServiceError> {
        self.redeem(TokenPolicy::PERMANENT, bearer, now).await
    }

    #[tracing::instrument(name = "access_links.deactivate", skip(self, now), err)]
    async fn deactivate_permanent(
        &self,
        quote_id: &str,
        email: &str,
        now: Timestamp,
    ) -> Result<u64, AccessLinksServiceError> {
        let owner = OwnerPair::parse(quote_id, email)?;

        self.owned_quote(&owner).await?;

        let deactivated = self
            .store
            .deactivate(&owner.quote_id, &owner.email, now)
            .await?;

        info!(deactivated, "permanent links deactivated");

        Ok(deactivated)
    }

    async fn list_links(
        &self,
        quote_id: &str,
        email: &str,
    ) -> Result<Vec<AccessLinkDescriptor>, AccessLinksServiceError> {
        let owner = OwnerPair::parse(quote_id, email)?;

        self.store
            .list(&owner.quote_id, &owner.email)
            .await
            .map_err(Into::into)
    }
}

#[automock]
#[async_trait]
/// Issue, redeem and revoke access links for quotes.
pub trait AccessLinksService: Send + Sync {
    /// Issue a 24-hour single-use link for a quote's owner.
    async fn issue_ephemeral(
        &self,
        quote_id: &str,
        email: &str,
        now: Timestamp,
    ) -> Result<IssuedLink, AccessLinksServiceError>;

    /// Redeem an ephemeral link, consuming it.
    async fn redeem_ephemeral(
        &self,
        bearer: &str,
        now: Timestamp,
    ) -> Result<Redemption, AccessLinksServiceError>;

    /// Issue (or re-issue) the permanent link for a quote's owner.
    async fn issue_permanent(
        &self,
        quote_id: &str,
        email: &str,
        now: Timestamp,
    ) -> Result<IssuedLink, AccessLinksServiceError>;

    /// Redeem a permanent link, stamping its last access.
    async fn redeem_permanent(
        &self,
        bearer: &str,
        now: Timestamp,
    ) -> Result<Redemption, AccessLinksServiceError>;

    /// Deactivate the owner's permanent links, returning how many were switched off.
    async fn deactivate_permanent(
        &self,
        quote_id: &str,
        email: &str,
        now: Timestamp,
    ) -> Result<u64, AccessLinksServiceError>;

    /// Every descriptor recorded for the pair.
    async fn list_links(
        &self,
        quote_id: &str,
        email: &str,
    ) -> Result<Vec<AccessLinkDescriptor>, AccessLinksServiceError>;
}
