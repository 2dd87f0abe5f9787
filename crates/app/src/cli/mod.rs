//! Admin commands. Each runs against the database named by `DATABASE_URL`.

use clap::{Parser, Subcommand};

mod db;
mod product;
mod token;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront admin CLI", long_about = None)]
pub(crate) struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage API bearer tokens
    #[command(subcommand)]
    Token(token::TokenCommand),

    /// Manage the product catalog
    #[command(subcommand)]
    Product(product::ProductCommand),

    /// Database maintenance
    #[command(subcommand)]
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let pool = storefront_app::database::connect(&self.database_url)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;

        match self.command {
            Commands::Token(command) => command.run(pool).await,
            Commands::Product(command) => command.run(pool).await,
            Commands::Db(command) => command.run(pool).await,
        }
    }
}
