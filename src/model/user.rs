use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "email": "jane.doe@company.com",
    "full_name": "Jane Doe",
    "role": "employee",
    "department_id": 2,
    "leave_balance": 17,
    "annual_entitlement": 20,
    "is_active": true,
    "last_login_at": "2026-03-02T08:58:10Z",
    "created_at": "2026-01-05T10:00:00Z"
}))]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub full_name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub department_id: Option<u64>,
    /// Remaining paid leave days
    pub leave_balance: i32,
    pub annual_entitlement: i32,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to onboard a user; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub department_id: Option<u64>,
    pub annual_entitlement: i32,
}

/// Partial update applied by an admin; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct UserChanges {
    #[schema(example = "Jane Smith")]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    #[schema(example = 3)]
    pub department_id: Option<u64>,
    #[schema(example = 25)]
    pub annual_entitlement: Option<i32>,
    #[schema(example = 12)]
    pub leave_balance: Option<i32>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self == &UserChanges::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub department_id: Option<u64>,
    pub search: Option<String>,
    pub include_inactive: bool,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "jane.doe@company.com", format = "email")]
    pub email: String,
    #[schema(example = "correct-horse-battery")]
    pub password: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    pub role: Role,
    #[schema(example = 2)]
    pub department_id: Option<u64>,
    /// Defaults to the configured annual leave
    #[schema(example = 20)]
    pub annual_entitlement: Option<i32>,
}
