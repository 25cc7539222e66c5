use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{MySqlPool, types::Json};

#[cfg(test)]
use mockall::automock;

use crate::error::{AppError, AppResult, is_constraint_violation};
use crate::model::time_entry::TimeEntry;

const ENTRY_COLUMNS: &str =
    "id, user_id, clock_in, clock_out, duration_seconds, location_in, location_out";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// The user's open entry, if any
    async fn find_open(&self, user_id: u64) -> AppResult<Option<TimeEntry>>;

    /// Opens a new entry; fails with `AlreadyClockedIn` when one is open.
    async fn open_entry(
        &self,
        user_id: u64,
        clock_in: DateTime<Utc>,
        location: Option<Value>,
    ) -> AppResult<TimeEntry>;

    /// Closes the entry if it is still open; `None` when it was closed meanwhile.
    async fn close_entry(
        &self,
        entry_id: u64,
        clock_out: DateTime<Utc>,
        duration_seconds: i64,
        location: Option<Value>,
    ) -> AppResult<Option<TimeEntry>>;

    /// Entries clocked in at or after `since`
    async fn entries_since(&self, user_id: u64, since: DateTime<Utc>) -> AppResult<Vec<TimeEntry>>;

    /// Most recent entries, newest first
    async fn history(&self, user_id: u64, limit: u32) -> AppResult<Vec<TimeEntry>>;
}

pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find(&self, entry_id: u64) -> AppResult<Option<TimeEntry>> {
        let sql = format!("SELECT {} FROM time_entries WHERE id = ?", ENTRY_COLUMNS);
        let entry = sqlx::query_as::<_, TimeEntry>(&sql)
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn find_open(&self, user_id: u64) -> AppResult<Option<TimeEntry>> {
        let sql = format!(
            "SELECT {} FROM time_entries WHERE user_id = ? AND clock_out IS NULL",
            ENTRY_COLUMNS
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn open_entry(
        &self,
        user_id: u64,
        clock_in: DateTime<Utc>,
        location: Option<Value>,
    ) -> AppResult<TimeEntry> {
        // uq_time_entries_open_user rejects a second open entry
        let result = sqlx::query(
            r#"
            INSERT INTO time_entries (user_id, clock_in, location_in)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(clock_in)
        .bind(location.map(Json))
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(r) => r,
            Err(e) if is_constraint_violation(&e) => return Err(AppError::AlreadyClockedIn),
            Err(e) => return Err(e.into()),
        };

        self.find(result.last_insert_id())
            .await?
            .ok_or_else(|| AppError::internal("time entry vanished after insert"))
    }

    async fn close_entry(
        &self,
        entry_id: u64,
        clock_out: DateTime<Utc>,
        duration_seconds: i64,
        location: Option<Value>,
    ) -> AppResult<Option<TimeEntry>> {
        let result = sqlx::query(
            r#"
            UPDATE time_entries
            SET clock_out = ?, duration_seconds = ?, location_out = ?
            WHERE id = ?
            AND clock_out IS NULL
            "#,
        )
        .bind(clock_out)
        .bind(duration_seconds)
        .bind(location.map(Json))
        .bind(entry_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find(entry_id).await
    }

    async fn entries_since(&self, user_id: u64, since: DateTime<Utc>) -> AppResult<Vec<TimeEntry>> {
        let sql = format!(
            "SELECT {} FROM time_entries WHERE user_id = ? AND clock_in >= ? ORDER BY clock_in",
            ENTRY_COLUMNS
        );
        let entries = sqlx::query_as::<_, TimeEntry>(&sql)
            .bind(user_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn history(&self, user_id: u64, limit: u32) -> AppResult<Vec<TimeEntry>> {
        let sql = format!(
            "SELECT {} FROM time_entries WHERE user_id = ? ORDER BY clock_in DESC LIMIT ?",
            ENTRY_COLUMNS
        );
        let entries = sqlx::query_as::<_, TimeEntry>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }
}
