use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 31,
    "user_id": 7,
    "clock_in": "2026-03-02T09:00:00Z",
    "clock_out": "2026-03-02T17:30:00Z",
    "duration_seconds": 30600,
    "location_in": {"lat": 52.52, "lng": 13.405},
    "location_out": null
}))]
pub struct TimeEntry {
    pub id: u64,
    pub user_id: u64,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    /// Set when the entry is closed
    pub duration_seconds: Option<i64>,
    #[schema(value_type = Option<Object>)]
    pub location_in: Option<Json<Value>>,
    #[schema(value_type = Option<Object>)]
    pub location_out: Option<Json<Value>>,
}

impl TimeEntry {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "is_clocked_in": true,
    "current_entry": {
        "id": 32,
        "user_id": 7,
        "clock_in": "2026-03-03T09:00:00Z",
        "clock_out": null,
        "duration_seconds": null,
        "location_in": null,
        "location_out": null
    },
    "weekly_seconds": 37800,
    "weekly_hours": 10.5
}))]
pub struct AttendanceStatus {
    pub is_clocked_in: bool,
    pub current_entry: Option<TimeEntry>,
    pub weekly_seconds: i64,
    pub weekly_hours: f64,
}
