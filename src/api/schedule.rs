use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::schedule::{NewSchedule, Schedule, ScheduleChanges};
use crate::services::ScheduleService;
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ScheduleQuery {
    /// Range start (RFC 3339)
    #[param(example = "2026-03-02T00:00:00Z", value_type = Option<String>)]
    pub start: Option<DateTime<Utc>>,
    /// Range end (RFC 3339), inclusive
    #[param(example = "2026-03-08T23:59:59Z", value_type = Option<String>)]
    pub end: Option<DateTime<Utc>>,
    /// Only this user's shifts (Manager/Admin)
    pub user_id: Option<u64>,
}

/// Shifts starting within a range
#[utoipa::path(
    get,
    path = "/api/schedules",
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Shifts ordered by start time", body = [Schedule]),
        (status = 400, description = "Missing or inverted range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees asking for someone else's shifts")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn list_schedules(
    auth: AuthUser,
    service: web::Data<ScheduleService>,
    query: web::Query<ScheduleQuery>,
) -> AppResult<HttpResponse> {
    let (Some(start), Some(end)) = (query.start, query.end) else {
        return Err(AppError::validation("Both start and end are required"));
    };

    let shifts = service
        .list(start, end, auth.user_id, auth.role, query.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(shifts))
}

/// Plan a shift (Manager/Admin)
#[utoipa::path(
    post,
    path = "/api/schedules",
    request_body = NewSchedule,
    responses(
        (status = 201, description = "Shift created", body = Schedule),
        (status = 400, description = "end_time not after start_time or unknown user"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn create_schedule(
    auth: AuthUser,
    service: web::Data<ScheduleService>,
    payload: web::Json<NewSchedule>,
) -> AppResult<HttpResponse> {
    auth.require_manager_or_admin()?;
    let created = service.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Change part of a shift (Manager/Admin)
#[utoipa::path(
    patch,
    path = "/api/schedules/{schedule_id}",
    params(("schedule_id" = u64, Path, description = "Shift id")),
    request_body = ScheduleChanges,
    responses(
        (status = 200, description = "Updated shift", body = Schedule),
        (status = 400, description = "Empty update or invalid range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Schedule not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn update_schedule(
    auth: AuthUser,
    service: web::Data<ScheduleService>,
    path: web::Path<u64>,
    payload: web::Json<ScheduleChanges>,
) -> AppResult<HttpResponse> {
    auth.require_manager_or_admin()?;
    let updated = service
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/schedules/{schedule_id}",
    params(("schedule_id" = u64, Path, description = "Shift id")),
    responses(
        (status = 204, description = "Shift removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Schedule not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn delete_schedule(
    auth: AuthUser,
    service: web::Data<ScheduleService>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_manager_or_admin()?;
    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
