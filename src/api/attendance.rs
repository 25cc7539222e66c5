use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::time_entry::{AttendanceStatus, TimeEntry};
use crate::services::AttendanceService;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Optional body for clock-in and clock-out.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ClockRequest {
    /// Free-form position reported by the device
    #[schema(value_type = Option<Object>, example = json!({"lat": 52.52, "lng": 13.405}))]
    pub location: Option<Value>,
}

fn location(payload: Option<web::Json<ClockRequest>>) -> Option<Value> {
    payload.and_then(|p| p.into_inner().location)
}

/* =========================
Clock in
========================= */
#[utoipa::path(
    post,
    path = "/api/attendance/clock-in",
    request_body(content = ClockRequest, description = "Optional location", content_type = "application/json"),
    responses(
        (status = 201, description = "Session opened", body = TimeEntry),
        (status = 400, description = "Already clocked in", body = Object, example = json!({
            "message": "Already clocked in",
            "code": "ALREADY_CLOCKED_IN"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    payload: Option<web::Json<ClockRequest>>,
) -> AppResult<HttpResponse> {
    let entry = service
        .clock_in(auth.user_id, Utc::now(), location(payload))
        .await?;
    Ok(HttpResponse::Created().json(entry))
}

/* =========================
Clock out
========================= */
#[utoipa::path(
    post,
    path = "/api/attendance/clock-out",
    request_body(content = ClockRequest, description = "Optional location", content_type = "application/json"),
    responses(
        (status = 200, description = "Session closed", body = TimeEntry),
        (status = 400, description = "Not clocked in", body = Object, example = json!({
            "message": "Not clocked in",
            "code": "NOT_CLOCKED_IN"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    payload: Option<web::Json<ClockRequest>>,
) -> AppResult<HttpResponse> {
    let entry = service
        .clock_out(auth.user_id, Utc::now(), location(payload))
        .await?;
    Ok(HttpResponse::Ok().json(entry))
}

/// Current session and hours worked this week
#[utoipa::path(
    get,
    path = "/api/attendance/status",
    responses(
        (status = 200, description = "Attendance status", body = AttendanceStatus),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn status(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> AppResult<HttpResponse> {
    let status = service.status(auth.user_id, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Most recent sessions, newest first
#[utoipa::path(
    get,
    path = "/api/attendance/history",
    responses(
        (status = 200, description = "Recent time entries", body = [TimeEntry]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> AppResult<HttpResponse> {
    let entries = service.history(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(entries))
}
