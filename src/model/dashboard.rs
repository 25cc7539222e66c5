use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::leave_request::{LeaveStatus, LeaveType};

/// Latest attendance row, reported as its most recent event.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceEventRow {
    pub entry_id: u64,
    pub user_id: u64,
    pub full_name: String,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeaveEventRow {
    pub leave_id: u64,
    pub user_id: u64,
    pub full_name: String,
    #[sqlx(try_from = "String")]
    pub leave_type: LeaveType,
    #[sqlx(try_from = "String")]
    pub status: LeaveStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ClockIn,
    ClockOut,
    LeaveRequested,
    LeaveApproved,
    LeaveRejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub user_id: u64,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    pub at: DateTime<Utc>,
    /// Id of the time entry or leave request behind the event
    pub reference_id: u64,
}

impl From<AttendanceEventRow> for ActivityItem {
    fn from(row: AttendanceEventRow) -> Self {
        let (kind, at) = match row.clock_out {
            Some(out) => (ActivityKind::ClockOut, out),
            None => (ActivityKind::ClockIn, row.clock_in),
        };
        ActivityItem {
            kind,
            user_id: row.user_id,
            full_name: row.full_name,
            at,
            reference_id: row.entry_id,
        }
    }
}

impl From<LeaveEventRow> for ActivityItem {
    fn from(row: LeaveEventRow) -> Self {
        let kind = match row.status {
            LeaveStatus::Pending => ActivityKind::LeaveRequested,
            LeaveStatus::Approved => ActivityKind::LeaveApproved,
            LeaveStatus::Rejected => ActivityKind::LeaveRejected,
        };
        ActivityItem {
            kind,
            user_id: row.user_id,
            full_name: row.full_name,
            at: row.updated_at,
            reference_id: row.leave_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "total_employees": 42,
    "clocked_in_now": 17,
    "active_this_week": 35,
    "pending_leaves": 4,
    "on_leave_today": 2,
    "recent_activity": [
        {"kind": "clock_in", "user_id": 7, "full_name": "Jane Doe", "at": "2026-03-02T09:00:00Z", "reference_id": 31}
    ]
}))]
pub struct DashboardStats {
    pub total_employees: i64,
    pub clocked_in_now: i64,
    pub active_this_week: i64,
    pub pending_leaves: i64,
    pub on_leave_today: i64,
    pub recent_activity: Vec<ActivityItem>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkforceRow {
    pub user_id: u64,
    pub full_name: String,
    pub department: Option<String>,
    pub open_since: Option<DateTime<Utc>>,
    /// Non-zero when an approved leave covers the day
    pub on_leave: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Working,
    OnLeave,
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WorkforceEntry {
    pub user_id: u64,
    pub full_name: String,
    pub department: Option<String>,
    pub status: PresenceStatus,
    /// Clock-in time while working
    pub since: Option<DateTime<Utc>>,
}

impl From<WorkforceRow> for WorkforceEntry {
    fn from(row: WorkforceRow) -> Self {
        // An open entry wins over leave: the person is on the clock.
        let status = match (row.open_since, row.on_leave != 0) {
            (Some(_), _) => PresenceStatus::Working,
            (None, true) => PresenceStatus::OnLeave,
            (None, false) => PresenceStatus::Off,
        };
        WorkforceEntry {
            user_id: row.user_id,
            full_name: row.full_name,
            department: row.department,
            status,
            since: row.open_since,
        }
    }
}
