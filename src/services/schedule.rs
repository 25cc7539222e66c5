use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::model::role::Role;
use crate::model::schedule::{NewSchedule, Schedule, ScheduleChanges};
use crate::store::ScheduleStore;

fn check_range(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if end <= start {
        return Err(AppError::validation("end_time must be after start_time"));
    }
    Ok(())
}

pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// Shifts starting inside `[start, end]`. Employees only ever see their own.
    pub async fn list(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        requester_id: u64,
        role: Role,
        user_id: Option<u64>,
    ) -> AppResult<Vec<Schedule>> {
        if end < start {
            return Err(AppError::validation("end cannot be before start"));
        }

        let user_id = if role.is_supervisor() {
            user_id
        } else {
            match user_id {
                Some(id) if id != requester_id => return Err(AppError::Forbidden),
                _ => Some(requester_id),
            }
        };

        self.store.list(start, end, user_id).await
    }

    pub async fn create(&self, schedule: NewSchedule) -> AppResult<Schedule> {
        check_range(schedule.start_time, schedule.end_time)?;

        let created = self.store.create(schedule).await?;
        info!(schedule_id = created.id, user_id = created.user_id, "Shift scheduled");
        Ok(created)
    }

    /// Partial update; the resulting shift must still end after it starts.
    pub async fn update(&self, schedule_id: u64, changes: ScheduleChanges) -> AppResult<Schedule> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields provided for update"));
        }

        let current = self
            .store
            .find(schedule_id)
            .await?
            .ok_or(AppError::NotFound("Schedule"))?;

        check_range(
            changes.start_time.unwrap_or(current.start_time),
            changes.end_time.unwrap_or(current.end_time),
        )?;

        self.store
            .update(schedule_id, changes)
            .await?
            .ok_or(AppError::NotFound("Schedule"))
    }

    pub async fn delete(&self, schedule_id: u64) -> AppResult<()> {
        if !self.store.delete(schedule_id).await? {
            return Err(AppError::NotFound("Schedule"));
        }
        info!(schedule_id, "Shift removed");
        Ok(())
    }
}
