use clap::{Parser, Subcommand};

mod db;
mod links;

#[derive(Debug, Parser)]
#[command(name = "quotelink-app", about = "Quote access link CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Issue, inspect and revoke access links
    Link(links::LinkCommand),

    /// Database maintenance
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Link(command) => links::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}
