//! Input validation for link requests.

use thiserror::Error;

/// Longest accepted quote id.
pub const MAX_QUOTE_ID_LEN: usize = 50;

/// Longest accepted email address.
pub const MAX_EMAIL_LEN: usize = 254;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Quote ID and email are required")]
    MissingOwner,

    #[error("Invalid quote ID")]
    InvalidQuoteId,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Token is required")]
    MissingToken,
}

/// A validated `(quoteId, email)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerPair {
    pub quote_id: String,
    pub email: String,
}

impl OwnerPair {
    /// Trim and validate a claimed owner.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn parse(quote_id: &str, email: &str) -> Result<Self, ValidationError> {
        let quote_id = quote_id.trim();
        let email = email.trim();

        if quote_id.is_empty() || email.is_empty() {
            return Err(ValidationError::MissingOwner);
        }

        if !is_valid_quote_id(quote_id) {
            return Err(ValidationError::InvalidQuoteId);
        }

        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(Self {
            quote_id: quote_id.to_string(),
            email: email.to_string(),
        })
    }
}

/// Require a non-blank bearer string.
///
/// # Errors
///
/// Returns [`ValidationError::MissingToken`] for an empty or blank token.
pub fn require_token(token: &str) -> Result<&str, ValidationError> {
    let token = token.trim();

    if token.is_empty() {
        return Err(ValidationError::MissingToken);
    }

    Ok(token)
}

fn is_valid_quote_id(quote_id: &str) -> bool {
    quote_id.len() <= MAX_QUOTE_ID_LEN
        && quote_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// `local@domain.tld` with no whitespace and a single `@`. The domain needs a
/// dot with at least one character on each side; it need not be the last dot.
fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(index, c)| c == '.' && index > 0 && index + 1 < domain.len())
}
