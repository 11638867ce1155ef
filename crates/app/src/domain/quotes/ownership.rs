//! Quote ownership checks.

use crate::domain::quotes::records::QuoteRecord;

/// Outcome of matching a `(quoteId, email)` pair against the quotes table.
#[derive(Debug, Clone, PartialEq)]
pub enum Ownership {
    /// The quote exists and belongs to the email.
    Owned(QuoteRecord),

    /// No quote with that id.
    Missing,

    /// The quote exists but belongs to someone else.
    Mismatch,
}

impl Ownership {
    /// Match a looked-up quote against a claimed owner. Emails compare exactly.
    #[must_use]
    pub fn check(quote: Option<QuoteRecord>, email: &str) -> Self {
        match quote {
            Some(quote) if quote.email == email => Self::Owned(quote),
            Some(_) => Self::Mismatch,
            None => Self::Missing,
        }
    }

    /// The quote, if owned.
    #[must_use]
    pub fn into_owned(self) -> Option<QuoteRecord> {
        match self {
            Self::Owned(quote) => Some(quote),
            Self::Missing | Self::Mismatch => None,
        }
    }
}
