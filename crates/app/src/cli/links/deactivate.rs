use clap::Args;
use jiff::Timestamp;

use super::ServiceArgs;

#[derive(Debug, Args)]
pub(crate) struct DeactivateLinksArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Quote whose permanent links should be deactivated
    #[arg(long)]
    quote_id: String,

    /// Owner email the links were issued to
    #[arg(long)]
    email: String,
}

pub(crate) async fn run(args: DeactivateLinksArgs) -> Result<(), String> {
    let context = args.service.context().await?;

    let deactivated = context
        .links
        .deactivate_permanent(&args.quote_id, &args.email, Timestamp::now())
        .await
        .map_err(|error| format!("failed to deactivate links: {error}"))?;

    if deactivated == 0 {
        println!("no active permanent links for {} / {}", args.quote_id, args.email);
    } else {
        println!("deactivated {deactivated} permanent link(s)");
    }

    Ok(())
}
