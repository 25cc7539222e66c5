use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;

#[cfg(test)]
use mockall::automock;

use crate::error::AppResult;
use crate::model::dashboard::{AttendanceEventRow, LeaveEventRow, WorkforceRow};
use crate::model::leave_request::{LeaveStatus, LeaveType};

#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct DashboardCounts {
    pub total_employees: i64,
    pub clocked_in_now: i64,
    pub active_this_week: i64,
    pub pending_leaves: i64,
    pub on_leave_today: i64,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn counts(&self, week_start: DateTime<Utc>, today: NaiveDate) -> AppResult<DashboardCounts>;

    /// Time entries ordered by their latest event, newest first
    async fn recent_attendance(&self, limit: u32) -> AppResult<Vec<AttendanceEventRow>>;

    /// Leave requests ordered by last change, newest first
    async fn recent_leaves(&self, limit: u32) -> AppResult<Vec<LeaveEventRow>>;

    /// One row per active user with presence facts for `today`
    async fn workforce(&self, today: NaiveDate) -> AppResult<Vec<WorkforceRow>>;
}

pub struct MySqlDashboardStore {
    pool: MySqlPool,
}

impl MySqlDashboardStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DashboardStore for MySqlDashboardStore {
    async fn counts(&self, week_start: DateTime<Utc>, today: NaiveDate) -> AppResult<DashboardCounts> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE is_active = 1) AS total_employees,
                (SELECT COUNT(*) FROM time_entries WHERE clock_out IS NULL) AS clocked_in_now,
                (SELECT COUNT(DISTINCT user_id) FROM time_entries WHERE clock_in >= ?) AS active_this_week,
                (SELECT COUNT(*) FROM leave_requests
                    WHERE status = ? AND leave_type <> ?) AS pending_leaves,
                (SELECT COUNT(DISTINCT user_id) FROM leave_requests
                    WHERE status = ? AND start_date <= ? AND end_date >= ?) AS on_leave_today
            "#,
        )
        .bind(week_start)
        .bind(LeaveStatus::Pending.as_ref())
        // sick leave never enters the review queue
        .bind(LeaveType::Sick.as_ref())
        .bind(LeaveStatus::Approved.as_ref())
        .bind(today)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn recent_attendance(&self, limit: u32) -> AppResult<Vec<AttendanceEventRow>> {
        let rows = sqlx::query_as::<_, AttendanceEventRow>(
            r#"
            SELECT te.id AS entry_id, te.user_id, u.full_name, te.clock_in, te.clock_out
            FROM time_entries te
            JOIN users u ON u.id = te.user_id
            ORDER BY COALESCE(te.clock_out, te.clock_in) DESC, te.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recent_leaves(&self, limit: u32) -> AppResult<Vec<LeaveEventRow>> {
        let rows = sqlx::query_as::<_, LeaveEventRow>(
            r#"
            SELECT lr.id AS leave_id, lr.user_id, u.full_name, lr.leave_type, lr.status, lr.updated_at
            FROM leave_requests lr
            JOIN users u ON u.id = lr.user_id
            ORDER BY lr.updated_at DESC, lr.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn workforce(&self, today: NaiveDate) -> AppResult<Vec<WorkforceRow>> {
        let rows = sqlx::query_as::<_, WorkforceRow>(
            r#"
            SELECT
                u.id AS user_id,
                u.full_name,
                d.name AS department,
                te.clock_in AS open_since,
                CAST(EXISTS(
                    SELECT 1 FROM leave_requests lr
                    WHERE lr.user_id = u.id
                    AND lr.status = ?
                    AND lr.start_date <= ?
                    AND lr.end_date >= ?
                ) AS SIGNED) AS on_leave
            FROM users u
            LEFT JOIN departments d ON d.id = u.department_id
            LEFT JOIN time_entries te ON te.user_id = u.id AND te.clock_out IS NULL
            WHERE u.is_active = 1
            ORDER BY u.full_name, u.id
            "#,
        )
        .bind(LeaveStatus::Approved.as_ref())
        .bind(today)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
