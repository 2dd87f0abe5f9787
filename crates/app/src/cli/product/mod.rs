use clap::Subcommand;
use sqlx::PgPool;

mod create;

#[derive(Debug, Subcommand)]
pub(crate) enum ProductCommand {
    /// Add a product; bundle prices are derived from `--price`
    Create(create::CreateProductArgs),
}

impl ProductCommand {
    pub(crate) async fn run(self, pool: PgPool) -> Result<(), String> {
        match self {
            Self::Create(args) => create::run(args, pool).await,
        }
    }
}
