use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Vacation,
    Sick,
    Unpaid,
}

impl LeaveType {
    /// Unpaid leave never touches the balance.
    pub fn is_paid(&self) -> bool {
        !matches!(self, LeaveType::Unpaid)
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl TryFrom<String> for LeaveType {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for LeaveStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 12,
    "user_id": 7,
    "reviewer_id": null,
    "leave_type": "vacation",
    "status": "pending",
    "start_date": "2026-03-02",
    "end_date": "2026-03-04",
    "reason": "Family visit",
    "deducted_days": 0,
    "created_at": "2026-02-20T11:04:00Z",
    "updated_at": "2026-02-20T11:04:00Z"
}))]
pub struct LeaveRequest {
    pub id: u64,
    pub user_id: u64,
    pub reviewer_id: Option<u64>,
    #[sqlx(try_from = "String")]
    pub leave_type: LeaveType,
    #[sqlx(try_from = "String")]
    pub status: LeaveStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    /// Days taken from the balance by the current approval, 0 otherwise
    pub deducted_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pending request as shown to reviewers, with the requester's name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct PendingLeave {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    #[sqlx(try_from = "String")]
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLeave {
    pub user_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// A status change together with its balance effect, applied atomically by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub leave_id: u64,
    pub user_id: u64,
    pub reviewer_id: u64,
    /// Status the request must still have when the change is applied
    pub from: LeaveStatus,
    pub to: LeaveStatus,
    /// Days to take from the balance; recorded as the new `deducted_days`
    pub deduct: i32,
    /// Days given back from a previous approval
    pub refund: i32,
}
