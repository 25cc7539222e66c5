use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

#[cfg(test)]
use mockall::automock;

use crate::error::{AppError, AppResult, is_constraint_violation};
use crate::model::schedule::{NewSchedule, Schedule, ScheduleChanges};
use crate::utils::db_utils::{UpdateSet, build_update_sql, execute_update};

const SCHEDULE_COLUMNS: &str =
    "id, user_id, start_time, end_time, role_label, shift_type, created_at";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Shifts starting within `[start, end]`, optionally for one user
    async fn list(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        user_id: Option<u64>,
    ) -> AppResult<Vec<Schedule>>;

    async fn find(&self, schedule_id: u64) -> AppResult<Option<Schedule>>;

    async fn create(&self, schedule: NewSchedule) -> AppResult<Schedule>;

    /// `None` when the shift does not exist
    async fn update(
        &self,
        schedule_id: u64,
        changes: ScheduleChanges,
    ) -> AppResult<Option<Schedule>>;

    /// `false` when the shift does not exist
    async fn delete(&self, schedule_id: u64) -> AppResult<bool>;
}

pub struct MySqlScheduleStore {
    pool: MySqlPool,
}

impl MySqlScheduleStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn unknown_user(e: sqlx::Error) -> AppError {
    if is_constraint_violation(&e) {
        AppError::validation("Unknown user")
    } else {
        e.into()
    }
}

#[async_trait]
impl ScheduleStore for MySqlScheduleStore {
    async fn list(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        user_id: Option<u64>,
    ) -> AppResult<Vec<Schedule>> {
        let mut sql = format!(
            "SELECT {} FROM schedules WHERE start_time >= ? AND start_time <= ?",
            SCHEDULE_COLUMNS
        );
        if user_id.is_some() {
            sql.push_str(" AND user_id = ?");
        }
        sql.push_str(" ORDER BY start_time, id");

        let mut query = sqlx::query_as::<_, Schedule>(&sql).bind(start).bind(end);
        if let Some(user_id) = user_id {
            query = query.bind(user_id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn find(&self, schedule_id: u64) -> AppResult<Option<Schedule>> {
        let sql = format!("SELECT {} FROM schedules WHERE id = ?", SCHEDULE_COLUMNS);
        let schedule = sqlx::query_as::<_, Schedule>(&sql)
            .bind(schedule_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(schedule)
    }

    async fn create(&self, schedule: NewSchedule) -> AppResult<Schedule> {
        let result = sqlx::query(
            r#"
            INSERT INTO schedules (user_id, start_time, end_time, role_label, shift_type)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(schedule.user_id)
        .bind(schedule.start_time)
        .bind(schedule.end_time)
        .bind(&schedule.role_label)
        .bind(schedule.shift_type.as_ref())
        .execute(&self.pool)
        .await
        .map_err(unknown_user)?;

        self.find(result.last_insert_id())
            .await?
            .ok_or_else(|| AppError::internal("schedule vanished after insert"))
    }

    async fn update(
        &self,
        schedule_id: u64,
        changes: ScheduleChanges,
    ) -> AppResult<Option<Schedule>> {
        let mut set = UpdateSet::new();
        set.set_opt("user_id", changes.user_id)
            .set_opt("start_time", changes.start_time)
            .set_opt("end_time", changes.end_time)
            .set_opt("role_label", changes.role_label)
            .set_opt("shift_type", changes.shift_type.map(|s| s.as_ref().to_string()));

        let update = build_update_sql("schedules", set, "id", schedule_id)?;
        execute_update(&self.pool, update)
            .await
            .map_err(unknown_user)?;

        // rows_affected is 0 for unchanged rows too, so re-read instead
        self.find(schedule_id).await
    }

    async fn delete(&self, schedule_id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
            .bind(schedule_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
