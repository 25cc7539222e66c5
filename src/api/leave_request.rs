use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeave, PendingLeave};
use crate::services::LeaveService;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "vacation")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-03-04", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family visit")]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveStatus {
    #[schema(example = "approved")]
    pub status: LeaveStatus,
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "start_date after end_date"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    payload: web::Json<CreateLeave>,
) -> AppResult<HttpResponse> {
    let payload = payload.into_inner();
    let leave = service
        .create(NewLeave {
            user_id: auth.user_id,
            leave_type: payload.leave_type,
            start_date: payload.start_date,
            end_date: payload.end_date,
            reason: payload
                .reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        })
        .await?;

    Ok(HttpResponse::Created().json(leave))
}

/// The caller's own leave requests, newest first
#[utoipa::path(
    get,
    path = "/api/leaves/me",
    responses(
        (status = 200, description = "Own leave requests", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    service: web::Data<LeaveService>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.mine(auth.user_id).await?))
}

/// Requests awaiting review (Manager/Admin)
#[utoipa::path(
    get,
    path = "/api/leaves/pending",
    responses(
        (status = 200, description = "Pending requests, oldest first", body = [PendingLeave]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    service: web::Data<LeaveService>,
) -> AppResult<HttpResponse> {
    auth.require_manager_or_admin()?;
    Ok(HttpResponse::Ok().json(service.pending().await?))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leaves/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found",
            "code": "NOT_FOUND"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let leave = service
        .get(path.into_inner(), auth.user_id, auth.role)
        .await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Approve / reject (Manager/Admin)
========================= */
#[utoipa::path(
    patch,
    path = "/api/leaves/{leave_id}/status",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to review")
    ),
    request_body = UpdateLeaveStatus,
    responses(
        (status = 200, description = "Status applied; unchanged status is a no-op", body = LeaveRequest),
        (status = 400, description = "Insufficient leave balance", body = Object, example = json!({
            "message": "Insufficient leave balance: 3 day(s) requested, 1 available",
            "code": "INSUFFICIENT_BALANCE"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request changed concurrently")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave_status(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveStatus>,
) -> AppResult<HttpResponse> {
    auth.require_manager_or_admin()?;

    let leave = service
        .update_status(path.into_inner(), payload.status, auth.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(leave))
}
