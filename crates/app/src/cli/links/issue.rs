use clap::Args;
use jiff::Timestamp;
use quotelink_app::tokens::TokenKind;

use super::{LinkKind, ServiceArgs};

#[derive(Debug, Args)]
pub(crate) struct IssueLinkArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Link variant to issue
    #[arg(long, value_enum)]
    kind: LinkKind,

    /// Quote the link grants access to
    #[arg(long)]
    quote_id: String,

    /// Owner email recorded on the quote
    #[arg(long)]
    email: String,
}

pub(crate) async fn run(args: IssueLinkArgs) -> Result<(), String> {
    let context = args.service.context().await?;
    let now = Timestamp::now();

    let issued = match TokenKind::from(args.kind) {
        TokenKind::EphemeralAccess => {
            context
                .links
                .issue_ephemeral(&args.quote_id, &args.email, now)
                .await
        }
        TokenKind::PermanentAccess => {
            context
                .links
                .issue_permanent(&args.quote_id, &args.email, now)
                .await
        }
    }
    .map_err(|error| format!("failed to issue link: {error}"))?;

    println!("token_id: {}", issued.token_id);
    println!("kind: {}", issued.kind);
    println!("quote_id: {}", issued.quote.quote_id);
    if let Some(expires_at) = issued.expires_at {
        println!("expires_at: {expires_at}");
    }
    println!("tracked: {}", issued.tracked);
    println!("link: {}", issued.url);

    Ok(())
}
