//! Compact three-segment token encoding.
//!
//! `base64url(header).base64url(claims).base64url(signature)`, no padding. The
//! signature covers the first two segments exactly as transmitted.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::tokens::{Claims, TokenError};

/// Segment delimiter.
pub const DELIMITER: char = '.';

pub const ALGORITHM: &str = "HS256";
pub const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct Header {
    alg: String,
    typ: String,
}

impl Header {
    fn fixed() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }
}

/// A token split into its parts, with header and claims already decoded.
#[derive(Debug)]
pub struct DecodedToken<'a> {
    /// `header_b64.claims_b64` as received; the bytes the signature covers.
    pub signing_input: &'a str,

    pub claims: Claims,

    /// Raw signature segment, decoded separately so that a bad signature is
    /// reported as such rather than as a parse failure.
    pub signature_segment: &'a str,
}

impl DecodedToken<'_> {
    /// Decode the signature segment.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidSignature`] when the segment is not base64url.
    pub fn signature(&self) -> Result<Vec<u8>, TokenError> {
        URL_SAFE_NO_PAD
            .decode(self.signature_segment)
            .map_err(|_invalid| TokenError::InvalidSignature)
    }
}

/// Encode the header and claims segments, returning the signing input.
///
/// # Errors
///
/// Returns [`TokenError::Encoding`] if the claims cannot be serialised.
pub fn encode_signing_input(claims: &Claims) -> Result<String, TokenError> {
    let header =
        serde_json::to_vec(&Header::fixed()).map_err(|_source| TokenError::Encoding)?;
    let claims = serde_json::to_vec(claims).map_err(|_source| TokenError::Encoding)?;

    Ok(format!(
        "{}{DELIMITER}{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(claims)
    ))
}

/// Append the signature segment to a signing input.
#[must_use]
pub fn attach_signature(signing_input: &str, signature: &[u8]) -> String {
    format!(
        "{signing_input}{DELIMITER}{}",
        URL_SAFE_NO_PAD.encode(signature)
    )
}

/// Split and decode a bearer string. The signature is not checked here.
///
/// # Errors
///
/// Returns [`TokenError::Malformed`] unless the token has exactly three
/// segments, the fixed header, and claims that parse as JSON data.
pub fn decode(bearer: &str) -> Result<DecodedToken<'_>, TokenError> {
    let (signing_input, signature_segment) = bearer
        .rsplit_once(DELIMITER)
        .ok_or(TokenError::Malformed)?;

    let (header_segment, claims_segment) = signing_input
        .split_once(DELIMITER)
        .ok_or(TokenError::Malformed)?;

    if claims_segment.contains(DELIMITER) {
        return Err(TokenError::Malformed);
    }

    let header: Header = decode_json_segment(header_segment)?;

    if header != Header::fixed() {
        return Err(TokenError::Malformed);
    }

    let claims: Claims = decode_json_segment(claims_segment)?;

    Ok(DecodedToken {
        signing_input,
        claims,
        signature_segment,
    })
}

fn decode_json_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_invalid| TokenError::Malformed)?;

    serde_json::from_slice(&bytes).map_err(|_invalid| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::tokens::TokenKind;

    use super::*;

    fn claims() -> Claims {
        Claims {
            quote_id: "WIN123".to_string(),
            email: "a@b.com".to_string(),
            kind: TokenKind::EphemeralAccess,
            issued_at: 1_700_000_000,
            expires_at: Some(1_700_086_400),
            token_id: Uuid::nil(),
            purpose: None,
        }
    }

    #[test]
    fn header_segment_is_fixed() -> TestResult {
        let input = encode_signing_input(&claims())?;
        let (header, _) = input.split_once('.').ok_or("missing delimiter")?;

        assert_eq!(
            URL_SAFE_NO_PAD.decode(header)?,
            br#"{"alg":"HS256","typ":"JWT"}"#.to_vec()
        );

        Ok(())
    }

    #[test]
    fn decode_recovers_claims_and_signature() -> TestResult {
        let input = encode_signing_input(&claims())?;
        let token = attach_signature(&input, &[1, 2, 3]);

        let decoded = decode(&token)?;

        assert_eq!(decoded.signing_input, input);
        assert_eq!(decoded.claims, claims());
        assert_eq!(decoded.signature()?, vec![1, 2, 3]);

        Ok(())
    }

    #[test]
    fn wrong_segment_counts_are_malformed() -> TestResult {
        let input = encode_signing_input(&claims())?;
        let token = attach_signature(&input, &[1, 2, 3]);

        assert_eq!(decode("").err(), Some(TokenError::Malformed));
        assert_eq!(decode("abc").err(), Some(TokenError::Malformed));
        assert_eq!(decode(&input).err(), Some(TokenError::Malformed));
        assert_eq!(
            decode(&format!("{token}.extra")).err(),
            Some(TokenError::Malformed)
        );

        Ok(())
    }

    #[test]
    fn foreign_header_is_malformed() -> TestResult {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims())?);

        assert_eq!(
            decode(&format!("{header}.{claims}.sig")).err(),
            Some(TokenError::Malformed)
        );

        Ok(())
    }

    #[test]
    fn non_json_claims_are_malformed() -> TestResult {
        let input = encode_signing_input(&claims())?;
        let (header, _) = input.split_once('.').ok_or("missing delimiter")?;
        let claims = URL_SAFE_NO_PAD.encode(b"function() { return 1; }");

        assert_eq!(
            decode(&format!("{header}.{claims}.sig")).err(),
            Some(TokenError::Malformed)
        );

        Ok(())
    }

    #[test]
    fn undecodable_signature_is_an_invalid_signature() -> TestResult {
        let input = encode_signing_input(&claims())?;
        let decoded = decode_owned(format!("{input}.***"))?;

        assert_eq!(decoded, Err(TokenError::InvalidSignature));

        Ok(())
    }

    fn decode_owned(token: String) -> Result<Result<Vec<u8>, TokenError>, TokenError> {
        decode(&token).map(|decoded| decoded.signature())
    }
}
