use clap::{Args, Subcommand, ValueEnum};
use quotelink_app::{
    context::AppContext,
    domain::access_links::LinkSettings,
    tokens::{SigningKey, TokenKind},
};

mod deactivate;
mod inspect;
mod issue;
mod list;

#[derive(Debug, Args)]
pub(crate) struct LinkCommand {
    #[command(subcommand)]
    command: LinkSubcommand,
}

#[derive(Debug, Subcommand)]
enum LinkSubcommand {
    /// Issue a link for a quote's owner
    Issue(issue::IssueLinkArgs),

    /// List recorded links for a quote and email
    List(list::ListLinksArgs),

    /// Deactivate permanent links for a quote and email
    Deactivate(deactivate::DeactivateLinksArgs),

    /// Decode a token and check its signature without touching the database
    Inspect(inspect::InspectLinkArgs),
}

pub(crate) async fn run(command: LinkCommand) -> Result<(), String> {
    match command.command {
        LinkSubcommand::Issue(args) => issue::run(args).await,
        LinkSubcommand::List(args) => list::run(args).await,
        LinkSubcommand::Deactivate(args) => deactivate::run(args).await,
        LinkSubcommand::Inspect(args) => inspect::run(&args),
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum LinkKind {
    Ephemeral,
    Permanent,
}

impl From<LinkKind> for TokenKind {
    fn from(kind: LinkKind) -> Self {
        match kind {
            LinkKind::Ephemeral => Self::EphemeralAccess,
            LinkKind::Permanent => Self::PermanentAccess,
        }
    }
}

/// Connection and signing settings shared by commands that reach the database.
#[derive(Debug, Args)]
pub(crate) struct ServiceArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Shared HMAC secret used to sign links
    #[arg(long, env = "LINK_SIGNING_SECRET", hide_env_values = true)]
    signing_secret: String,

    /// Public origin that links point at
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:3000")]
    public_base_url: String,
}

impl ServiceArgs {
    pub(crate) async fn context(self) -> Result<AppContext, String> {
        let key = signing_key(self.signing_secret)?;

        AppContext::from_database_url(
            &self.database_url,
            LinkSettings::new(key, &self.public_base_url),
        )
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))
    }
}

pub(crate) fn signing_key(secret: String) -> Result<SigningKey, String> {
    SigningKey::new(secret).map_err(|error| format!("invalid signing secret: {error}"))
}
