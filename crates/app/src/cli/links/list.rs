use clap::Args;
use jiff::Timestamp;
use quotelink_app::domain::access_links::records::DescriptorStatus;

use super::ServiceArgs;

#[derive(Debug, Args)]
pub(crate) struct ListLinksArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Quote whose links should be listed
    #[arg(long)]
    quote_id: String,

    /// Owner email the links were issued to
    #[arg(long)]
    email: String,
}

pub(crate) async fn run(args: ListLinksArgs) -> Result<(), String> {
    let context = args.service.context().await?;

    let descriptors = context
        .links
        .list_links(&args.quote_id, &args.email)
        .await
        .map_err(|error| format!("failed to list links: {error}"))?;

    if descriptors.is_empty() {
        println!("no links found for {} / {}", args.quote_id, args.email);
        return Ok(());
    }

    let now = Timestamp::now();

    for descriptor in descriptors {
        println!("token_id: {}", descriptor.token_id);
        println!("kind: {}", descriptor.kind());
        println!("state: {}", descriptor.state(now).as_str());
        println!("created_at: {}", descriptor.created_at);

        match descriptor.status {
            DescriptorStatus::Ephemeral {
                expires_at,
                used_at,
                ..
            } => {
                println!("expires_at: {expires_at}");
                println!(
                    "used_at: {}",
                    used_at.map_or_else(|| "never".to_string(), |value| value.to_string())
                );
            }
            DescriptorStatus::Permanent {
                purpose,
                deactivated_at,
                last_accessed_at,
                ..
            } => {
                println!("purpose: {purpose}");
                println!(
                    "last_accessed_at: {}",
                    last_accessed_at.map_or_else(|| "never".to_string(), |value| value.to_string())
                );
                println!(
                    "deactivated_at: {}",
                    deactivated_at.map_or_else(|| "active".to_string(), |value| value.to_string())
                );
            }
        }
        println!();
    }

    Ok(())
}
