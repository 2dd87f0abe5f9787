use clap::Subcommand;
use sqlx::PgPool;
use storefront_app::auth::PgAuthService;

mod create;
mod list;
mod revoke;

#[derive(Debug, Subcommand)]
pub(crate) enum TokenCommand {
    /// Issue a token and print it once
    Create(create::CreateTokenArgs),

    /// Show a user's tokens without their secrets
    List(list::ListTokensArgs),

    /// Stop a token from authenticating
    Revoke(revoke::RevokeTokenArgs),
}

impl TokenCommand {
    pub(crate) async fn run(self, pool: PgPool) -> Result<(), String> {
        let service = PgAuthService::new(pool);

        match self {
            Self::Create(args) => create::run(args, &service).await,
            Self::List(args) => list::run(args, &service).await,
            Self::Revoke(args) => revoke::run(args, &service).await,
        }
    }
}
