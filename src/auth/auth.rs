use crate::error::{AppError, AppResult};
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// Caller identity placed in the request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or(AppError::Unauthorized),
        )
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn require_manager_or_admin(&self) -> AppResult<()> {
        if self.role.is_supervisor() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Employees may only act on their own records.
    pub fn require_self_or_supervisor(&self, user_id: u64) -> AppResult<()> {
        if self.user_id == user_id || self.role.is_supervisor() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}
