//! Access Link Records

use jiff::Timestamp;
use uuid::Uuid;

use crate::tokens::{TokenKind, TokenState};

/// Token Descriptor
///
/// One row per issued token. Holds a hash of the bearer string, never the
/// string itself. Descriptors are never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLinkDescriptor {
    pub token_id: Uuid,
    pub quote_id: String,
    pub email: String,

    /// SHA-256 hex of the full bearer string.
    pub token_hash: String,

    pub created_at: Timestamp,
    pub status: DescriptorStatus,
}

/// Variant-specific descriptor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorStatus {
    Ephemeral {
        expires_at: Timestamp,
        used: bool,
        used_at: Option<Timestamp>,
    },
    Permanent {
        purpose: String,
        is_active: bool,
        deactivated_at: Option<Timestamp>,
        last_accessed_at: Option<Timestamp>,
    },
}

impl AccessLinkDescriptor {
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self.status {
            DescriptorStatus::Ephemeral { .. } => TokenKind::EphemeralAccess,
            DescriptorStatus::Permanent { .. } => TokenKind::PermanentAccess,
        }
    }

    /// Lifecycle state of the descriptor as of `now`.
    #[must_use]
    pub fn state(&self, now: Timestamp) -> TokenState {
        match &self.status {
            DescriptorStatus::Ephemeral { used: true, .. } => TokenState::Consumed,
            DescriptorStatus::Ephemeral { expires_at, .. } if *expires_at <= now => {
                TokenState::Expired
            }
            DescriptorStatus::Permanent {
                is_active: false, ..
            } => TokenState::Deactivated,
            DescriptorStatus::Ephemeral { .. } | DescriptorStatus::Permanent { .. } => {
                TokenState::Issued
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;

    fn ephemeral(used: bool, expires_at: Timestamp) -> AccessLinkDescriptor {
        AccessLinkDescriptor {
            token_id: Uuid::nil(),
            quote_id: "WIN123".to_string(),
            email: "a@b.com".to_string(),
            token_hash: String::new(),
            created_at: Timestamp::UNIX_EPOCH,
            status: DescriptorStatus::Ephemeral {
                expires_at,
                used,
                used_at: None,
            },
        }
    }

    fn permanent(is_active: bool) -> AccessLinkDescriptor {
        AccessLinkDescriptor {
            token_id: Uuid::nil(),
            quote_id: "WIN123".to_string(),
            email: "a@b.com".to_string(),
            token_hash: String::new(),
            created_at: Timestamp::UNIX_EPOCH,
            status: DescriptorStatus::Permanent {
                purpose: "quote_payment_access".to_string(),
                is_active,
                deactivated_at: None,
                last_accessed_at: None,
            },
        }
    }

    #[test]
    fn ephemeral_states() {
        let now = Timestamp::now();
        let later = now + SignedDuration::from_hours(1);

        assert_eq!(ephemeral(false, later).state(now), TokenState::Issued);
        assert_eq!(ephemeral(false, now).state(now), TokenState::Expired);
        assert_eq!(ephemeral(true, later).state(now), TokenState::Consumed);
        assert_eq!(ephemeral(true, later).kind(), TokenKind::EphemeralAccess);
    }

    #[test]
    fn permanent_states() {
        let now = Timestamp::now();

        assert_eq!(permanent(true).state(now), TokenState::Issued);
        assert_eq!(permanent(false).state(now), TokenState::Deactivated);
        assert_eq!(permanent(true).kind(), TokenKind::PermanentAccess);
    }
}
