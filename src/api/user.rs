use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::role::Role;
use crate::model::user::{CreateUser, User, UserChanges, UserFilter};
use crate::services::UserService;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserQuery {
    /// Pagination page number (start with 1)
    #[param(example = 1)]
    pub page: Option<u32>,
    #[param(example = 20)]
    pub per_page: Option<u32>,
    pub role: Option<Role>,
    pub department_id: Option<u64>,
    /// Matches name or email
    #[param(example = "jane")]
    pub search: Option<String>,
    /// Include deactivated accounts
    pub include_inactive: Option<bool>,
}

impl From<UserQuery> for UserFilter {
    fn from(q: UserQuery) -> Self {
        UserFilter {
            role: q.role,
            department_id: q.department_id,
            search: q.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            include_inactive: q.include_inactive.unwrap_or(false),
            page: q.page.unwrap_or(1).max(1),
            per_page: q.per_page.unwrap_or(20).clamp(1, 100),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<User>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// List users (Manager/Admin)
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Paginated user list", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    service: web::Data<UserService>,
    query: web::Query<UserQuery>,
) -> AppResult<HttpResponse> {
    auth.require_manager_or_admin()?;

    let filter = UserFilter::from(query.into_inner());
    let (page, per_page) = (filter.page, filter.per_page);
    let (data, total) = service.list(filter).await?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// The caller's own profile, including the leave balance
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Own profile", body = User),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn me(auth: AuthUser, service: web::Data<UserService>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.get(auth.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(("user_id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    auth: AuthUser,
    service: web::Data<UserService>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    auth.require_self_or_supervisor(user_id)?;
    Ok(HttpResponse::Ok().json(service.get(user_id).await?))
}

/// Onboard a user (Admin)
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered", body = Object, example = json!({
            "message": "Email already registered",
            "code": "CONFLICT"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn create_user(
    auth: AuthUser,
    service: web::Data<UserService>,
    payload: web::Json<CreateUser>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let user = service.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Update a user (Admin)
#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    params(("user_id" = u64, Path, description = "User id")),
    request_body = UserChanges,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Empty update or negative leave days"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    auth: AuthUser,
    service: web::Data<UserService>,
    path: web::Path<u64>,
    payload: web::Json<UserChanges>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let user = service
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Deactivate a user (Admin). History is kept.
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    params(("user_id" = u64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deactivated"),
        (status = 400, description = "Cannot deactivate yourself"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    auth: AuthUser,
    service: web::Data<UserService>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    service.deactivate(path.into_inner(), auth.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_and_clamps() {
        let filter = UserFilter::from(UserQuery {
            page: Some(0),
            per_page: Some(500),
            role: None,
            department_id: None,
            search: Some("   ".into()),
            include_inactive: None,
        });

        assert_eq!(filter.page, 1);
        assert_eq!(filter.per_page, 100);
        assert_eq!(filter.search, None);
        assert!(!filter.include_inactive);
    }
}
