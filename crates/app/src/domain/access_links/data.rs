//! Access Link Data

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    domain::quotes::records::QuoteRecord,
    tokens::{Claims, TokenKind, TokenState},
};

/// New Descriptor Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDescriptor {
    pub token_id: Uuid,
    pub quote_id: String,
    pub email: String,
    pub token_hash: String,
    pub created_at: Timestamp,

    /// Ephemeral descriptors only.
    pub expires_at: Option<Timestamp>,

    /// Permanent descriptors only.
    pub purpose: Option<String>,
}

/// A freshly issued access link.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedLink {
    pub kind: TokenKind,
    pub token_id: Uuid,

    /// Full access URL carrying the bearer string.
    pub url: String,

    pub expires_at: Option<Timestamp>,

    /// `false` when the descriptor could not be written and the link is untracked.
    pub tracked: bool,

    pub quote: QuoteRecord,
}

/// A successful redemption.
#[derive(Debug, Clone, PartialEq)]
pub struct Redemption {
    pub claims: Claims,

    /// Quote snapshot taken during the ownership re-check.
    pub quote: QuoteRecord,

    /// [`TokenState::Consumed`] or [`TokenState::Issued`] for tracked tokens,
    /// [`TokenState::Untracked`] otherwise.
    pub state: TokenState,
}
