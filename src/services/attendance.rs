use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use super::calendar::{elapsed_seconds, to_hours, week_start, weekly_seconds};
use crate::error::{AppError, AppResult};
use crate::model::time_entry::{AttendanceStatus, TimeEntry};
use crate::store::AttendanceStore;

pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    history_limit: u32,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>, history_limit: u32) -> Self {
        Self {
            store,
            history_limit,
        }
    }

    /// Opens a session; the store's unique open-entry key rejects a second one.
    #[instrument(name = "attendance_clock_in", skip(self, location))]
    pub async fn clock_in(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        location: Option<Value>,
    ) -> AppResult<TimeEntry> {
        // DATETIME columns hold whole seconds
        let now = now.trunc_subsecs(0);
        let entry = self.store.open_entry(user_id, now, location).await?;
        info!(entry_id = entry.id, "Clocked in");
        Ok(entry)
    }

    #[instrument(name = "attendance_clock_out", skip(self, location))]
    pub async fn clock_out(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        location: Option<Value>,
    ) -> AppResult<TimeEntry> {
        let now = now.trunc_subsecs(0);
        let open = self
            .store
            .find_open(user_id)
            .await?
            .ok_or(AppError::NotClockedIn)?;

        let duration = elapsed_seconds(open.clock_in, now);

        // None: a concurrent clock-out closed it first
        let closed = self
            .store
            .close_entry(open.id, now, duration, location)
            .await?
            .ok_or(AppError::NotClockedIn)?;

        info!(entry_id = closed.id, duration_seconds = duration, "Clocked out");
        Ok(closed)
    }

    pub async fn status(&self, user_id: u64, now: DateTime<Utc>) -> AppResult<AttendanceStatus> {
        let since = week_start(now);
        let entries = self.store.entries_since(user_id, since).await?;

        // an entry opened before the week started is still the current one
        let current_entry = match entries.iter().find(|e| e.is_open()) {
            Some(open) => Some(open.clone()),
            None => self.store.find_open(user_id).await?,
        };

        let seconds = weekly_seconds(&entries, since, now);

        Ok(AttendanceStatus {
            is_clocked_in: current_entry.is_some(),
            current_entry,
            weekly_seconds: seconds,
            weekly_hours: to_hours(seconds),
        })
    }

    pub async fn history(&self, user_id: u64) -> AppResult<Vec<TimeEntry>> {
        self.store.history(user_id, self.history_limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::attendance::MockAttendanceStore;
    use mockall::predicate::eq;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn open_entry(id: u64, clock_in: &str) -> TimeEntry {
        TimeEntry {
            id,
            user_id: 7,
            clock_in: at(clock_in),
            clock_out: None,
            duration_seconds: None,
            location_in: None,
            location_out: None,
        }
    }

    fn closed(mut entry: TimeEntry, out: DateTime<Utc>, duration: i64) -> TimeEntry {
        entry.clock_out = Some(out);
        entry.duration_seconds = Some(duration);
        entry
    }

    #[actix_web::test]
    async fn clock_in_while_open_is_rejected() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_open_entry()
            .returning(|_, _, _| Err(AppError::AlreadyClockedIn));

        let service = AttendanceService::new(Arc::new(store), 20);
        let err = service
            .clock_in(7, at("2026-03-02T09:00:00Z"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyClockedIn));
    }

    #[actix_web::test]
    async fn clock_out_records_whole_seconds() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_find_open()
            .with(eq(7))
            .returning(|_| Ok(Some(open_entry(31, "2026-03-02T09:00:00Z"))));
        store
            .expect_close_entry()
            .withf(|id, _, duration, _| *id == 31 && *duration == 30_600)
            .returning(|_, out, duration, _| {
                Ok(Some(closed(open_entry(31, "2026-03-02T09:00:00Z"), out, duration)))
            });

        let service = AttendanceService::new(Arc::new(store), 20);
        let entry = service
            .clock_out(7, at("2026-03-02T17:30:00Z"), None)
            .await
            .unwrap();

        assert_eq!(entry.duration_seconds, Some(30_600));
        assert_eq!(entry.clock_out, Some(at("2026-03-02T17:30:00Z")));
    }

    #[actix_web::test]
    async fn clock_out_drops_fractional_seconds_before_storing() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_find_open()
            .returning(|_| Ok(Some(open_entry(31, "2026-03-02T09:00:00Z"))));
        store
            .expect_close_entry()
            .withf(|_, out, duration, _| {
                *out == at("2026-03-02T17:29:59Z") && *duration == 30_599
            })
            .times(1)
            .returning(|_, out, duration, _| {
                Ok(Some(closed(open_entry(31, "2026-03-02T09:00:00Z"), out, duration)))
            });

        let service = AttendanceService::new(Arc::new(store), 20);
        let entry = service
            .clock_out(7, at("2026-03-02T17:29:59.600Z"), None)
            .await
            .unwrap();

        let stored_delta = (entry.clock_out.unwrap() - entry.clock_in).num_seconds();
        assert_eq!(entry.duration_seconds, Some(stored_delta));
    }

    #[actix_web::test]
    async fn clock_in_stores_a_whole_second() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_open_entry()
            .withf(|_, clock_in, _| *clock_in == at("2026-03-02T08:59:59Z"))
            .times(1)
            .returning(|_, clock_in, _| {
                let mut entry = open_entry(31, "2026-03-02T08:59:59Z");
                entry.clock_in = clock_in;
                Ok(entry)
            });

        let service = AttendanceService::new(Arc::new(store), 20);
        let entry = service
            .clock_in(7, at("2026-03-02T08:59:59.999Z"), None)
            .await
            .unwrap();

        assert_eq!(entry.clock_in.timestamp_subsec_nanos(), 0);
    }

    #[actix_web::test]
    async fn clock_out_without_open_entry_fails() {
        let mut store = MockAttendanceStore::new();
        store.expect_find_open().returning(|_| Ok(None));
        store.expect_close_entry().never();

        let service = AttendanceService::new(Arc::new(store), 20);
        let err = service
            .clock_out(7, at("2026-03-02T17:30:00Z"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotClockedIn));
    }

    #[actix_web::test]
    async fn clock_out_losing_a_race_reports_not_clocked_in() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_find_open()
            .returning(|_| Ok(Some(open_entry(31, "2026-03-02T09:00:00Z"))));
        store.expect_close_entry().returning(|_, _, _, _| Ok(None));

        let service = AttendanceService::new(Arc::new(store), 20);
        let err = service
            .clock_out(7, at("2026-03-02T17:30:00Z"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotClockedIn));
    }

    #[actix_web::test]
    async fn status_sums_closed_durations_and_live_time() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_entries_since()
            .withf(|user_id, since| *user_id == 7 && *since == at("2026-03-02T00:00:00Z"))
            .returning(|_, _| {
                Ok(vec![
                    closed(
                        open_entry(31, "2026-03-02T09:00:00Z"),
                        at("2026-03-02T17:30:00Z"),
                        30_600,
                    ),
                    open_entry(32, "2026-03-03T09:00:00Z"),
                ])
            });
        store.expect_find_open().never();

        let service = AttendanceService::new(Arc::new(store), 20);
        let status = service.status(7, at("2026-03-03T11:00:00Z")).await.unwrap();

        assert!(status.is_clocked_in);
        assert_eq!(status.current_entry.map(|e| e.id), Some(32));
        assert_eq!(status.weekly_seconds, 37_800);
        assert_eq!(status.weekly_hours, 10.5);
    }

    #[actix_web::test]
    async fn status_reports_entry_opened_last_week() {
        let mut store = MockAttendanceStore::new();
        store.expect_entries_since().returning(|_, _| Ok(vec![]));
        store
            .expect_find_open()
            .returning(|_| Ok(Some(open_entry(30, "2026-03-01T22:00:00Z"))));

        let service = AttendanceService::new(Arc::new(store), 20);
        let status = service.status(7, at("2026-03-02T02:00:00Z")).await.unwrap();

        assert!(status.is_clocked_in);
        assert_eq!(status.weekly_seconds, 0);
    }

    #[actix_web::test]
    async fn history_uses_configured_limit() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_history()
            .with(eq(7), eq(20))
            .returning(|_, _| Ok(vec![]));

        let service = AttendanceService::new(Arc::new(store), 20);
        assert!(service.history(7).await.unwrap().is_empty());
    }
}
