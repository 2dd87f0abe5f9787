//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use storefront::users::UserUuid;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    ApiTokenMetadata, ApiTokenSecret, ApiTokenVersion, AuthServiceError, IssuedApiToken, Principal,
    Role, format_api_token, models::NewApiToken, parse_api_token, repository::PgAuthRepository,
    token_verifier, verifiers_match,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgAuthRepository::new(pool),
        }
    }

    /// Issue a new API token for `user`.
    ///
    /// The raw token is only ever returned here.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insertion fails.
    pub async fn issue_api_token(
        &self,
        user: UserUuid,
        role: Role,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        self.store(
            Uuid::now_v7(),
            ApiTokenVersion::V1,
            ApiTokenSecret::generate(),
            user,
            role,
            expires_at,
        )
        .await
    }

    /// Register a caller-supplied token, e.g. one generated ahead of
    /// provisioning.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::Token`] if `token` is malformed, or an
    /// error if the database insertion fails.
    pub async fn import_api_token(
        &self,
        token: &str,
        user: UserUuid,
        role: Role,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        let parsed = parse_api_token(token)?;

        self.store(
            parsed.token_uuid,
            parsed.version,
            parsed.secret,
            user,
            role,
            expires_at,
        )
        .await
    }

    async fn store(
        &self,
        token_uuid: Uuid,
        version: ApiTokenVersion,
        secret: ApiTokenSecret,
        user: UserUuid,
        role: Role,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        let token = format_api_token(token_uuid, version, &secret);
        let token_hash = token_verifier(&token_uuid, version, user, role, &secret);

        let metadata = self
            .repository
            .create_api_token(&NewApiToken {
                uuid: token_uuid,
                user_uuid: user,
                role,
                version,
                token_hash,
                expires_at,
            })
            .await?;

        info!(token_uuid = %metadata.uuid, user_uuid = %user, %role, "issued api token");

        Ok(IssuedApiToken { token, metadata })
    }

    /// List all tokens of `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_api_tokens(
        &self,
        user: UserUuid,
    ) -> Result<Vec<ApiTokenMetadata>, AuthServiceError> {
        Ok(self.repository.list_api_tokens(user).await?)
    }

    /// Revoke a token by uuid. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        let revoked = self.repository.revoke_api_token(token_uuid).await?;

        Ok(revoked.is_some())
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        let parsed = parse_api_token(bearer_token).map_err(|_| AuthServiceError::NotFound)?;

        let token = self
            .repository
            .find_active_api_token(parsed.token_uuid, parsed.version)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        let expected = token_verifier(
            &parsed.token_uuid,
            token.version,
            token.user_uuid,
            token.role,
            &parsed.secret,
        );

        if !verifiers_match(&expected, &token.token_hash) {
            return Err(AuthServiceError::NotFound);
        }

        // Usage tracking is best effort.
        if let Err(error) = self.repository.touch_api_token(parsed.token_uuid).await {
            warn!(%error, token_uuid = %parsed.token_uuid, "failed to record token use");
        }

        Ok(Principal {
            user_uuid: token.user_uuid,
            role: token.role,
        })
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a raw bearer token to its principal.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn issued_token_authenticates_as_its_owner() -> TestResult {
        let ctx = TestContext::new().await;

        let issued = ctx
            .auth
            .issue_api_token(ctx.user_uuid, Role::Admin, None)
            .await?;

        assert!(issued.token.starts_with("sf_v1_"));

        let principal = ctx.auth.authenticate_bearer(&issued.token).await?;

        assert_eq!(principal.user_uuid, ctx.user_uuid);
        assert_eq!(principal.role, Role::Admin);

        let tokens = ctx.auth.list_api_tokens(ctx.user_uuid).await?;

        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].last_used_at.is_some(), "use is recorded");

        Ok(())
    }

    #[tokio::test]
    async fn tampered_secret_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        let issued = ctx
            .auth
            .issue_api_token(ctx.user_uuid, Role::Customer, None)
            .await?;

        let last = if issued.token.ends_with('0') { '1' } else { '0' };
        let tampered = format!("{}{last}", &issued.token[..issued.token.len() - 1]);

        let result = ctx.auth.authenticate_bearer(&tampered).await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn revoked_tokens_stop_working() -> TestResult {
        let ctx = TestContext::new().await;

        let issued = ctx
            .auth
            .issue_api_token(ctx.user_uuid, Role::Customer, None)
            .await?;

        assert!(ctx.auth.revoke_api_token(issued.metadata.uuid).await?);
        assert!(
            !ctx.auth.revoke_api_token(issued.metadata.uuid).await?,
            "second revoke is a no-op"
        );

        let result = ctx.auth.authenticate_bearer(&issued.token).await;

        assert!(matches!(result, Err(AuthServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn expired_tokens_stop_working() -> TestResult {
        let ctx = TestContext::new().await;

        let expired = Timestamp::now() - SignedDuration::from_secs(60);

        let issued = ctx
            .auth
            .issue_api_token(ctx.user_uuid, Role::Customer, Some(expired))
            .await?;

        let result = ctx.auth.authenticate_bearer(&issued.token).await;

        assert!(matches!(result, Err(AuthServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn imported_token_keeps_its_text() -> TestResult {
        let ctx = TestContext::new().await;

        let raw = format!("sf_v1_{}.{}", Uuid::now_v7().simple(), "7f".repeat(32));

        let issued = ctx
            .auth
            .import_api_token(&raw, ctx.user_uuid, Role::Customer, None)
            .await?;

        assert_eq!(issued.token, raw);
        assert_eq!(
            ctx.auth.authenticate_bearer(&raw).await?.role,
            Role::Customer
        );

        let duplicate = ctx
            .auth
            .import_api_token(&raw, ctx.user_uuid, Role::Admin, None)
            .await;

        assert!(matches!(duplicate, Err(AuthServiceError::AlreadyExists)));

        Ok(())
    }

    #[tokio::test]
    async fn malformed_bearer_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.auth.authenticate_bearer("Bearer nonsense").await;

        assert!(matches!(result, Err(AuthServiceError::NotFound)));
    }
}
