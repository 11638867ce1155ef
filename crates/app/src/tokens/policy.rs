//! Token policies and lifecycle states.
//!
//! Both link variants run through the same issue/verify engine; a policy
//! decides which gates and transitions apply.

use jiff::{SignedDuration, Timestamp};
use uuid::Uuid;

use crate::tokens::{Claims, TokenError, TokenKind};

/// Lifetime of an ephemeral magic link.
pub const EPHEMERAL_LIFETIME: SignedDuration = SignedDuration::from_hours(24);

/// Purpose tag stamped into permanent links.
pub const PERMANENT_PURPOSE: &str = "quote_payment_access";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub kind: TokenKind,

    /// `None` means the token never expires.
    pub lifetime: Option<SignedDuration>,

    /// A successful redemption consumes the descriptor.
    pub single_use: bool,

    /// Descriptors can be deactivated, and re-issuance supersedes older tokens.
    pub revocable: bool,

    pub purpose: Option<&'static str>,
}

impl TokenPolicy {
    pub const EPHEMERAL: Self = Self {
        kind: TokenKind::EphemeralAccess,
        lifetime: Some(EPHEMERAL_LIFETIME),
        single_use: true,
        revocable: false,
        purpose: None,
    };

    pub const PERMANENT: Self = Self {
        kind: TokenKind::PermanentAccess,
        lifetime: None,
        single_use: false,
        revocable: true,
        purpose: Some(PERMANENT_PURPOSE),
    };

    /// The policy tokens of `kind` are issued and verified under.
    #[must_use]
    pub const fn for_kind(kind: TokenKind) -> Self {
        match kind {
            TokenKind::EphemeralAccess => Self::EPHEMERAL,
            TokenKind::PermanentAccess => Self::PERMANENT,
        }
    }

    #[must_use]
    pub const fn has_expiry(&self) -> bool {
        self.lifetime.is_some()
    }

    /// Build fresh claims for an issuance at `now`.
    #[must_use]
    pub fn claims_for(&self, quote_id: &str, email: &str, token_id: Uuid, now: Timestamp) -> Claims {
        let issued_at = now.as_second();

        Claims {
            quote_id: quote_id.to_string(),
            email: email.to_string(),
            kind: self.kind,
            issued_at,
            expires_at: self
                .lifetime
                .map(|lifetime| issued_at.saturating_add(lifetime.as_secs())),
            token_id,
            purpose: self.purpose.map(str::to_string),
        }
    }

    /// Apply the stateless gates that follow signature verification: expiry, then type.
    ///
    /// # Errors
    ///
    /// [`TokenError::Malformed`] when an expiring policy meets claims without `expiresAt`;
    /// [`TokenError::Expired`] once `now` has reached `expiresAt`;
    /// [`TokenError::WrongType`] when the claims belong to the other variant.
    pub fn check_claims(&self, claims: &Claims, now: Timestamp) -> Result<(), TokenError> {
        if self.has_expiry() {
            match claims.expires_at {
                None => return Err(TokenError::Malformed),
                Some(expires_at) if now.as_second() >= expires_at => {
                    return Err(TokenError::Expired);
                }
                Some(_) => {}
            }
        }

        if claims.kind != self.kind {
            return Err(TokenError::WrongType);
        }

        Ok(())
    }
}

/// Where a token sits in its lifecycle after a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Tracked by a live descriptor and still redeemable.
    Issued,

    /// Single-use token whose descriptor has been claimed.
    Consumed,

    Expired,

    /// Revocable token whose descriptor was switched off.
    Deactivated,

    /// Cryptographically valid but with no descriptor on record.
    Untracked,
}

impl TokenState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Consumed => "consumed",
            Self::Expired => "expired",
            Self::Deactivated => "deactivated",
            Self::Untracked => "untracked",
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    #[test]
    fn ephemeral_claims_expire_after_twenty_four_hours() {
        let claims = TokenPolicy::EPHEMERAL.claims_for("WIN123", "a@b.com", Uuid::nil(), now());

        assert_eq!(claims.kind, TokenKind::EphemeralAccess);
        assert_eq!(claims.issued_at, 1_700_000_000);
        assert_eq!(claims.expires_at, Some(1_700_000_000 + 86_400));
        assert_eq!(claims.purpose, None);
    }

    #[test]
    fn permanent_claims_carry_purpose_and_no_expiry() {
        let claims = TokenPolicy::PERMANENT.claims_for("WIN123", "a@b.com", Uuid::nil(), now());

        assert_eq!(claims.kind, TokenKind::PermanentAccess);
        assert_eq!(claims.expires_at, None);
        assert_eq!(claims.purpose.as_deref(), Some(PERMANENT_PURPOSE));
    }

    #[test]
    fn expiry_boundary() -> TestResult {
        let claims = TokenPolicy::EPHEMERAL.claims_for("WIN123", "a@b.com", Uuid::nil(), now());
        let expires_at = Timestamp::from_second(claims.expires_at.ok_or("missing expiry")?)?;

        let one_second_before = expires_at - SignedDuration::from_secs(1);

        assert_eq!(
            TokenPolicy::EPHEMERAL.check_claims(&claims, one_second_before),
            Ok(())
        );
        assert_eq!(
            TokenPolicy::EPHEMERAL.check_claims(&claims, expires_at),
            Err(TokenError::Expired)
        );

        Ok(())
    }

    #[test]
    fn ephemeral_claims_without_expiry_are_malformed() {
        let mut claims = TokenPolicy::EPHEMERAL.claims_for("WIN123", "a@b.com", Uuid::nil(), now());
        claims.expires_at = None;

        let much_later = now() + SignedDuration::from_hours(24 * 365 * 10);

        assert_eq!(
            TokenPolicy::EPHEMERAL.check_claims(&claims, now()),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            TokenPolicy::EPHEMERAL.check_claims(&claims, much_later),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn expiry_is_checked_before_type() {
        let mut claims = TokenPolicy::EPHEMERAL.claims_for("WIN123", "a@b.com", Uuid::nil(), now());
        claims.kind = TokenKind::PermanentAccess;

        let later = now() + SignedDuration::from_hours(48);

        assert_eq!(
            TokenPolicy::EPHEMERAL.check_claims(&claims, later),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn variants_reject_each_other() {
        let ephemeral = TokenPolicy::EPHEMERAL.claims_for("WIN123", "a@b.com", Uuid::nil(), now());
        let permanent = TokenPolicy::PERMANENT.claims_for("WIN123", "a@b.com", Uuid::nil(), now());

        assert_eq!(
            TokenPolicy::PERMANENT.check_claims(&ephemeral, now()),
            Err(TokenError::WrongType)
        );
        assert_eq!(
            TokenPolicy::EPHEMERAL.check_claims(&permanent, now()),
            Err(TokenError::WrongType)
        );
    }

    #[test]
    fn policies_match_their_kind() {
        for kind in [TokenKind::EphemeralAccess, TokenKind::PermanentAccess] {
            assert_eq!(TokenPolicy::for_kind(kind).kind, kind);
        }
    }

    #[test]
    fn permanent_tokens_never_expire() {
        let claims = TokenPolicy::PERMANENT.claims_for("WIN123", "a@b.com", Uuid::nil(), now());
        let far_future = now() + SignedDuration::from_hours(24 * 365 * 10);

        assert_eq!(TokenPolicy::PERMANENT.check_claims(&claims, far_future), Ok(()));
    }
}
