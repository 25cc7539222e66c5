use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::dashboard::{DashboardStats, WorkforceEntry};
use crate::services::DashboardService;
use actix_web::{HttpResponse, web};
use chrono::Utc;

/// Headline numbers and recent activity (Manager/Admin)
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Dashboard figures", body = DashboardStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn stats(
    auth: AuthUser,
    service: web::Data<DashboardService>,
) -> AppResult<HttpResponse> {
    auth.require_manager_or_admin()?;
    Ok(HttpResponse::Ok().json(service.stats(Utc::now()).await?))
}

/// Who is working, on leave or off right now (Manager/Admin)
#[utoipa::path(
    get,
    path = "/api/admin/workforce-status",
    responses(
        (status = 200, description = "One row per active user", body = [WorkforceEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn workforce_status(
    auth: AuthUser,
    service: web::Data<DashboardService>,
) -> AppResult<HttpResponse> {
    auth.require_manager_or_admin()?;
    Ok(HttpResponse::Ok().json(service.workforce(Utc::now()).await?))
}
