use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::auth::jwt::{generate_token, verify_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::model::user::User;
use crate::models::{TokenPair, TokenType};
use crate::store::{TokenStore, UserStore};

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    jwt_secret: String,
    access_token_ttl: usize,
    refresh_token_ttl: usize,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        jwt_secret: String,
        access_token_ttl: usize,
        refresh_token_ttl: usize,
    ) -> Self {
        Self {
            users,
            tokens,
            jwt_secret,
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    async fn issue(&self, user: &User) -> AppResult<TokenPair> {
        let (access_token, _) = generate_token(
            user,
            TokenType::Access,
            &self.jwt_secret,
            self.access_token_ttl,
        )?;
        let (refresh_token, refresh_claims) = generate_token(
            user,
            TokenType::Refresh,
            &self.jwt_secret,
            self.refresh_token_ttl,
        )?;

        self.tokens
            .store(user.id, refresh_claims.jti.clone(), refresh_claims.expires_at())
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl,
        })
    }

    #[instrument(name = "auth_login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<TokenPair> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }

        let user = match self.users.find_by_email(&email.trim().to_lowercase()).await? {
            Some(user) if user.is_active => user,
            Some(_) => {
                info!("Login refused for deactivated user");
                return Err(AppError::InvalidCredentials);
            }
            None => {
                debug!("Unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash) {
            info!(user_id = user.id, "Wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let pair = self.issue(&user).await?;

        // non-fatal
        if let Err(e) = self.users.touch_login(user.id).await {
            warn!(error = %e, user_id = user.id, "Failed to update last_login_at");
        }

        info!(user_id = user.id, "Login successful");
        Ok(pair)
    }

    /// Rotates a refresh token: the presented one is revoked, a new pair issued.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = verify_token(refresh_token, &self.jwt_secret)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::Unauthorized);
        }

        // only one caller can win the revoke of a given jti
        if !self.tokens.revoke(claims.jti.clone()).await? {
            warn!(user_id = claims.user_id, "Refresh token reused or revoked");
            return Err(AppError::Unauthorized);
        }

        // role and active flag come from the database, not the old token
        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::Unauthorized)?;

        self.issue(&user).await
    }

    /// Revokes a refresh token; anything unusable is silently ignored.
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let Ok(claims) = verify_token(refresh_token, &self.jwt_secret) else {
            return Ok(());
        };
        if claims.token_type != TokenType::Refresh {
            return Ok(());
        }
        self.tokens.revoke(claims.jti).await?;
        Ok(())
    }
}
