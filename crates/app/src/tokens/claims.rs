//! Signed access-link claims.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which link variant a token was issued as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived, single-use magic link.
    EphemeralAccess,

    /// Non-expiring, revocable win-back link.
    PermanentAccess,
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EphemeralAccess => "ephemeral_access",
            Self::PermanentAccess => "permanent_access",
        }
    }

    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn variant(self) -> &'static str {
        match self {
            Self::EphemeralAccess => "ephemeral",
            Self::PermanentAccess => "permanent",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload carried inside a bearer string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub quote_id: String,

    /// Owner email, matched case-sensitively against the quote.
    pub email: String,

    #[serde(rename = "type")]
    pub kind: TokenKind,

    /// Unix seconds.
    pub issued_at: i64,

    /// Unix seconds; ephemeral tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    pub token_id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl Claims {
    /// Issue time as a timestamp.
    #[must_use]
    pub fn issued_at_timestamp(&self) -> Option<Timestamp> {
        Timestamp::from_second(self.issued_at).ok()
    }

    /// Expiry as a timestamp, when the claims carry one that is representable.
    #[must_use]
    pub fn expires_at_timestamp(&self) -> Option<Timestamp> {
        self.expires_at
            .and_then(|seconds| Timestamp::from_second(seconds).ok())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn ephemeral_claims_serialise_with_camel_case_keys() -> TestResult {
        let claims = Claims {
            quote_id: "WIN123".to_string(),
            email: "a@b.com".to_string(),
            kind: TokenKind::EphemeralAccess,
            issued_at: 1_700_000_000,
            expires_at: Some(1_700_086_400),
            token_id: Uuid::nil(),
            purpose: None,
        };

        assert_eq!(
            serde_json::to_value(&claims)?,
            json!({
                "quoteId": "WIN123",
                "email": "a@b.com",
                "type": "ephemeral_access",
                "issuedAt": 1_700_000_000,
                "expiresAt": 1_700_086_400,
                "tokenId": "00000000-0000-0000-0000-000000000000",
            })
        );

        Ok(())
    }

    #[test]
    fn permanent_claims_omit_expiry() -> TestResult {
        let value = json!({
            "quoteId": "WIN123",
            "email": "a@b.com",
            "type": "permanent_access",
            "issuedAt": 1_700_000_000,
            "tokenId": "00000000-0000-0000-0000-000000000000",
            "purpose": "quote_payment_access",
        });

        let claims: Claims = serde_json::from_value(value)?;

        assert_eq!(claims.kind, TokenKind::PermanentAccess);
        assert_eq!(claims.expires_at, None);
        assert_eq!(claims.purpose.as_deref(), Some("quote_payment_access"));

        Ok(())
    }

    #[test]
    fn unknown_token_type_is_rejected() {
        let value = json!({
            "quoteId": "WIN123",
            "email": "a@b.com",
            "type": "magic_link",
            "issuedAt": 1,
            "tokenId": "00000000-0000-0000-0000-000000000000",
        });

        assert!(serde_json::from_value::<Claims>(value).is_err());
    }
}
