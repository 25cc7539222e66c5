use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShiftType {
    Morning,
    Afternoon,
    Night,
    Custom,
}

impl TryFrom<String> for ShiftType {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 4,
    "user_id": 7,
    "start_time": "2026-03-03T06:00:00Z",
    "end_time": "2026-03-03T14:00:00Z",
    "role_label": "Cashier",
    "shift_type": "morning",
    "created_at": "2026-02-27T15:12:00Z"
}))]
pub struct Schedule {
    pub id: u64,
    pub user_id: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub role_label: Option<String>,
    #[sqlx(try_from = "String")]
    pub shift_type: ShiftType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct NewSchedule {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "2026-03-03T06:00:00Z")]
    pub start_time: DateTime<Utc>,
    #[schema(example = "2026-03-03T14:00:00Z")]
    pub end_time: DateTime<Utc>,
    #[schema(example = "Cashier")]
    pub role_label: Option<String>,
    pub shift_type: ShiftType,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct ScheduleChanges {
    pub user_id: Option<u64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub role_label: Option<String>,
    pub shift_type: Option<ShiftType>,
}

impl ScheduleChanges {
    pub fn is_empty(&self) -> bool {
        self == &ScheduleChanges::default()
    }
}
