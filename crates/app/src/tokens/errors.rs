//! Token verification errors.

use thiserror::Error;

/// Reasons a bearer string fails the stateless verification gates.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Wrong segment count, bad encoding, unexpected header or unreadable claims.
    #[error("token is malformed")]
    Malformed,

    /// Signature segment does not match the header and claims.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// The token's `expiresAt` has passed.
    #[error("token has expired")]
    Expired,

    /// The token was issued for the other link variant.
    #[error("token type is not accepted here")]
    WrongType,

    /// Claims could not be serialised while sealing a token.
    #[error("token claims could not be encoded")]
    Encoding,
}
