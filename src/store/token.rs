use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

#[cfg(test)]
use mockall::automock;

use crate::error::AppResult;

/// Persisted refresh tokens, keyed by their `jti` claim.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn store(&self, user_id: u64, jti: String, expires_at: DateTime<Utc>) -> AppResult<()>;

    /// Revokes an active token; `false` when unknown, expired or already revoked.
    async fn revoke(&self, jti: String) -> AppResult<bool>;
}

pub struct MySqlTokenStore {
    pool: MySqlPool,
}

impl MySqlTokenStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for MySqlTokenStore {
    async fn store(&self, user_id: u64, jti: String, expires_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, jti, expires_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn revoke(&self, jti: String) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = 1
            WHERE jti = ?
            AND revoked = 0
            AND expires_at > UTC_TIMESTAMP()
            "#,
        )
        .bind(jti)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
