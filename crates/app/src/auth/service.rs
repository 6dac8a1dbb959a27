//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::{
        ApiTokenVersion, AuthServiceError, AuthenticatedUser, IssuedApiToken, format_api_token,
        generate_api_token_secret, models::NewApiToken, parse_api_token,
        repository::PgAuthRepository, token_verifier,
    },
    database::Db,
    domain::users::records::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAuthRepository::new(),
        }
    }

    /// Issue a new API token for the given user. The raw token is only ever returned here.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the database insertion fails.
    #[tracing::instrument(name = "auth.service.issue_api_token", skip(self), err)]
    pub async fn issue_api_token(&self, user: UserUuid) -> Result<IssuedApiToken, AuthServiceError> {
        let token_uuid = Uuid::now_v7();
        let version = ApiTokenVersion::V1;
        let secret = generate_api_token_secret();
        let token = format_api_token(token_uuid, version, &secret);

        let mut tx = self.db.begin().await?;

        let metadata = self
            .repository
            .create_api_token(
                &mut tx,
                &NewApiToken {
                    uuid: token_uuid,
                    user_uuid: user,
                    version,
                    token_hash: token_verifier(&token_uuid, version, &user, &secret),
                },
            )
            .await
            .map_err(|error| match error.as_database_error() {
                Some(db) if db.is_foreign_key_violation() => AuthServiceError::NotFound,
                _ => AuthServiceError::from(error),
            })?;

        tx.commit().await?;

        info!(token_uuid = %metadata.uuid, "issued api token");

        Ok(IssuedApiToken { token, metadata })
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError> {
        let parsed = parse_api_token(bearer_token).or(Err(AuthServiceError::NotFound))?;

        let mut tx = self.db.begin().await?;

        let token = self
            .repository
            .find_active_api_token(&mut tx, parsed.token_uuid)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if token.version != parsed.version {
            return Err(AuthServiceError::NotFound);
        }

        let verifier = token_verifier(
            &parsed.token_uuid,
            parsed.version,
            &token.user.uuid,
            &parsed.secret,
        );

        if verifier != token.token_hash {
            debug!(token_uuid = %parsed.token_uuid, "bearer token verifier mismatch");

            return Err(AuthServiceError::NotFound);
        }

        self.repository
            .touch_api_token_last_used(&mut tx, parsed.token_uuid)
            .await?;

        tx.commit().await?;

        Ok(token.user)
    }
}

#[automock]
#[async_trait]
/// Bearer token verification.
pub trait AuthService: Send + Sync {
    /// Resolve a raw bearer token to its user. Unknown, revoked and malformed tokens are all
    /// reported as `NotFound`.
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError>;
}
