use clap::Args;
use storefront::users::UserUuid;
use storefront_app::auth::PgAuthService;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct ListTokensArgs {
    /// User whose tokens should be listed
    #[arg(long)]
    user_uuid: Uuid,
}

fn or_placeholder(value: Option<impl ToString>, placeholder: &str) -> String {
    value.map_or_else(|| placeholder.to_string(), |value| value.to_string())
}

pub(crate) async fn run(args: ListTokensArgs, service: &PgAuthService) -> Result<(), String> {
    let tokens = service
        .list_api_tokens(UserUuid::from_uuid(args.user_uuid))
        .await
        .map_err(|error| format!("failed to list tokens: {error}"))?;

    if tokens.is_empty() {
        println!("no tokens found for user {}", args.user_uuid);
        return Ok(());
    }

    for token in tokens {
        println!("token_uuid: {}", token.uuid);
        println!("role: {}", token.role);
        println!("created_at: {}", token.created_at);
        println!("last_used_at: {}", or_placeholder(token.last_used_at, "never"));
        println!("expires_at: {}", or_placeholder(token.expires_at, "none"));
        println!("revoked_at: {}", or_placeholder(token.revoked_at, "active"));
        println!();
    }

    Ok(())
}
