use clap::Args;
use jiff::Timestamp;
use storefront::users::UserUuid;
use storefront_app::auth::{PgAuthService, Role};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    /// User the token authenticates as
    #[arg(long)]
    user_uuid: Uuid,

    /// Role granted to the token (`customer` or `admin`)
    #[arg(long, default_value = "customer")]
    role: Role,

    /// Register this pre-generated `sf_v1_` token instead of generating one
    #[arg(long)]
    token: Option<String>,

    /// Optional token expiration timestamp (RFC 3339)
    #[arg(long)]
    token_expires_at: Option<Timestamp>,
}

pub(crate) async fn run(args: CreateTokenArgs, service: &PgAuthService) -> Result<(), String> {
    if let Some(expires_at) = args.token_expires_at
        && expires_at <= Timestamp::now()
    {
        return Err("token-expires-at must be in the future".to_string());
    }

    let user = UserUuid::from_uuid(args.user_uuid);

    let issued = match args.token.as_deref() {
        Some(token) => {
            service
                .import_api_token(token, user, args.role, args.token_expires_at)
                .await
        }
        None => {
            service
                .issue_api_token(user, args.role, args.token_expires_at)
                .await
        }
    }
    .map_err(|error| format!("failed to create token: {error}"))?;

    println!("token_uuid: {}", issued.metadata.uuid);
    println!("user_uuid: {}", issued.metadata.user_uuid);
    println!("role: {}", issued.metadata.role);
    println!("token_created_at: {}", issued.metadata.created_at);
    if let Some(expires_at) = issued.metadata.expires_at {
        println!("token_expires_at: {expires_at}");
    }
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
