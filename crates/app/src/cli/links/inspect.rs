use clap::Args;
use jiff::Timestamp;
use quotelink_app::tokens::{BearerTokens, Hs256Tokens, TokenError, TokenPolicy, codec};

use super::signing_key;

#[derive(Debug, Args)]
pub(crate) struct InspectLinkArgs {
    /// Bearer token, or a full link carrying `?token=`
    #[arg(long)]
    token: String,

    /// Shared HMAC secret used to sign links
    #[arg(long, env = "LINK_SIGNING_SECRET", hide_env_values = true)]
    signing_secret: String,
}

pub(crate) fn run(args: &InspectLinkArgs) -> Result<(), String> {
    let bearer = args
        .token
        .split_once("?token=")
        .map_or(args.token.as_str(), |(_, token)| token);

    let decoded = codec::decode(bearer).map_err(|error| format!("cannot decode token: {error}"))?;
    let claims = &decoded.claims;

    println!("token_id: {}", claims.token_id);
    println!("kind: {}", claims.kind);
    println!("quote_id: {}", claims.quote_id);
    println!("email: {}", claims.email);
    println!(
        "issued_at: {}",
        claims
            .issued_at_timestamp()
            .map_or_else(|| claims.issued_at.to_string(), |value| value.to_string())
    );
    if let Some(expires_at) = claims.expires_at {
        println!(
            "expires_at: {}",
            claims
                .expires_at_timestamp()
                .map_or_else(|| expires_at.to_string(), |value| value.to_string())
        );
    }
    if let Some(purpose) = &claims.purpose {
        println!("purpose: {purpose}");
    }

    let tokens = Hs256Tokens::new(signing_key(args.signing_secret.clone())?);

    let verdict = tokens
        .open(bearer)
        .and_then(|claims| TokenPolicy::for_kind(claims.kind).check_claims(&claims, Timestamp::now()));

    match verdict {
        Ok(()) => println!("status: valid"),
        Err(TokenError::Expired) => println!("status: expired"),
        Err(error) => println!("status: {error}"),
    }

    Ok(())
}
