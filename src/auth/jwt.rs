use chrono::{TimeZone, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::error::AppResult;
use crate::model::user::User;
use crate::models::{Claims, TokenType};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

/// Signs a token of the given type for `user`, valid for `ttl` seconds.
pub fn generate_token(
    user: &User,
    token_type: TokenType,
    secret: &str,
    ttl: usize,
) -> AppResult<(String, Claims)> {
    let claims = Claims {
        user_id: user.id,
        sub: user.email.clone(),
        role: user.role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

impl Claims {
    pub fn expires_at(&self) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(self.exp as i64, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}
