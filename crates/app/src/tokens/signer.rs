//! HMAC-SHA-256 signing key and primitive.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroize;

/// Minimum accepted signing secret length in bytes.
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

/// Length of an HMAC-SHA-256 signature in bytes.
pub const SIGNATURE_BYTES: usize = 32;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningKeyError {
    #[error("signing secret must be at least {MIN_SIGNING_KEY_BYTES} bytes, got {0}")]
    TooShort(usize),

    #[error("signing secret was rejected by the MAC")]
    InvalidLength,
}

/// Shared symmetric secret used for every access-link token.
///
/// The raw secret is zeroized as soon as the keyed MAC state has been derived
/// from it; only that state is retained.
#[derive(Clone)]
pub struct SigningKey {
    mac: HmacSha256,
}

impl SigningKey {
    /// Wrap a secret, rejecting ones too short to be a safe HMAC key.
    ///
    /// # Errors
    ///
    /// Returns [`SigningKeyError::TooShort`] when the secret is shorter than
    /// [`MIN_SIGNING_KEY_BYTES`].
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, SigningKeyError> {
        let mut bytes = secret.into();
        let len = bytes.len();

        let mac = if len < MIN_SIGNING_KEY_BYTES {
            Err(SigningKeyError::TooShort(len))
        } else {
            HmacSha256::new_from_slice(&bytes).map_err(|_invalid| SigningKeyError::InvalidLength)
        };

        bytes.zeroize();

        Ok(Self { mac: mac? })
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(**redacted**)")
    }
}

/// Compute the keyed MAC of `payload`.
#[must_use]
pub fn sign(payload: &[u8], key: &SigningKey) -> [u8; SIGNATURE_BYTES] {
    let mut mac = key.mac.clone();

    mac.update(payload);

    mac.finalize().into_bytes().into()
}

/// Recompute the MAC of `payload` and compare it to `signature` in constant time.
#[must_use]
pub fn verify(payload: &[u8], signature: &[u8], key: &SigningKey) -> bool {
    let expected = sign(payload, key);

    constant_time_eq(&expected, signature)
}

/// Constant-time byte comparison. Length differences are not secret.
#[must_use]
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.ct_eq(right).into()
}

/// One-way hash of a full bearer string, stored on descriptors instead of the token.
#[must_use]
pub fn hash_bearer(bearer: &str) -> String {
    format!("{:x}", Sha256::digest(bearer.as_bytes()))
}
