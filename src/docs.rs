use crate::api::{
    attendance::ClockRequest,
    department::CreateDepartment,
    leave_request::{CreateLeave, UpdateLeaveStatus},
    user::UserListResponse,
};
use crate::model::{
    dashboard::{ActivityItem, ActivityKind, DashboardStats, PresenceStatus, WorkforceEntry},
    department::Department,
    leave_request::{LeaveRequest, LeaveStatus, LeaveType, PendingLeave},
    role::Role,
    schedule::{NewSchedule, Schedule, ScheduleChanges, ShiftType},
    time_entry::{AttendanceStatus, TimeEntry},
    user::{CreateUser, User, UserChanges},
};
use crate::models::{LoginReqDto, RefreshReqDto, TokenPair};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Workforce API",
        version = "1.0.0",
        description = r#"
## Workforce time tracking and leave management

### Key Features
- **Attendance**: clock in and out, weekly hours, history
- **Leave**: requests, review with balance deduction and refund
- **Schedules**: shift planning per user
- **Admin**: live dashboard and workforce status
- **Users**: onboarding, roles, departments

### Security
Everything outside `/auth` requires a **JWT Bearer** access token from `/auth/login`.
Reviewing leave, planning shifts and the dashboard need the **manager** or **admin** role;
user management needs **admin**.

### Errors
Failures are JSON: `{"message": "...", "code": "..."}`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::status,
        crate::api::attendance::history,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::pending_leaves,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::update_leave_status,

        crate::api::schedule::list_schedules,
        crate::api::schedule::create_schedule,
        crate::api::schedule::update_schedule,
        crate::api::schedule::delete_schedule,

        crate::api::admin::stats,
        crate::api::admin::workforce_status,

        crate::api::user::list_users,
        crate::api::user::me,
        crate::api::user::get_user,
        crate::api::user::create_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,

        crate::api::department::list_departments,
        crate::api::department::create_department
    ),
    components(
        schemas(
            LoginReqDto,
            RefreshReqDto,
            TokenPair,
            ClockRequest,
            TimeEntry,
            AttendanceStatus,
            CreateLeave,
            UpdateLeaveStatus,
            LeaveRequest,
            PendingLeave,
            LeaveType,
            LeaveStatus,
            Schedule,
            NewSchedule,
            ScheduleChanges,
            ShiftType,
            DashboardStats,
            ActivityItem,
            ActivityKind,
            WorkforceEntry,
            PresenceStatus,
            User,
            CreateUser,
            UserChanges,
            UserListResponse,
            Role,
            Department,
            CreateDepartment
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and token rotation"),
        (name = "Attendance", description = "Clock in/out and worked hours"),
        (name = "Leave", description = "Leave requests and review"),
        (name = "Schedule", description = "Shift planning"),
        (name = "Admin", description = "Dashboard aggregates"),
        (name = "Users", description = "User management"),
        (name = "Departments", description = "Departments"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the handlers.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
