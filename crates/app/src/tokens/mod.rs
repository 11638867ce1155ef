//! Signed bearer tokens.

mod claims;
pub mod codec;
mod errors;
mod policy;
mod signer;

pub use claims::{Claims, TokenKind};
pub use errors::TokenError;
pub use policy::{EPHEMERAL_LIFETIME, PERMANENT_PURPOSE, TokenPolicy, TokenState};
pub use signer::{
    MIN_SIGNING_KEY_BYTES, SigningKey, SigningKeyError, constant_time_eq, hash_bearer, sign,
    verify,
};

/// Seals claims into bearer strings and opens them again.
pub trait BearerTokens: Send + Sync {
    /// Serialise and sign claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if the claims cannot be serialised.
    fn seal(&self, claims: &Claims) -> Result<String, TokenError>;

    /// Parse a bearer string and check its signature. Expiry and type are
    /// left to the caller's [`TokenPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] or [`TokenError::InvalidSignature`].
    fn open(&self, bearer: &str) -> Result<Claims, TokenError>;
}

/// HS256 tokens under one shared secret.
#[derive(Debug, Clone)]
pub struct Hs256Tokens {
    key: SigningKey,
}

impl Hs256Tokens {
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }
}

impl BearerTokens for Hs256Tokens {
    fn seal(&self, claims: &Claims) -> Result<String, TokenError> {
        let signing_input = codec::encode_signing_input(claims)?;
        let signature = sign(signing_input.as_bytes(), &self.key);

        Ok(codec::attach_signature(&signing_input, &signature))
    }

    fn open(&self, bearer: &str) -> Result<Claims, TokenError> {
        let decoded = codec::decode(bearer)?;
        let signature = decoded.signature()?;

        if !verify(decoded.signing_input.as_bytes(), &signature, &self.key) {
            return Err(TokenError::InvalidSignature);
        }

        Ok(decoded.claims)
    }
}
