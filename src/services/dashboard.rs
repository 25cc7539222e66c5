use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::calendar::week_start;
use crate::error::AppResult;
use crate::model::dashboard::{
    ActivityItem, AttendanceEventRow, DashboardStats, LeaveEventRow, WorkforceEntry,
};
use crate::store::DashboardStore;

/// Events taken from each stream before merging.
const RECENT_PER_STREAM: u32 = 5;

/// Merges both event streams by their own timestamps, newest first.
pub fn merge_activity(
    attendance: Vec<AttendanceEventRow>,
    leaves: Vec<LeaveEventRow>,
    limit: usize,
) -> Vec<ActivityItem> {
    let mut items: Vec<ActivityItem> = attendance
        .into_iter()
        .map(ActivityItem::from)
        .chain(leaves.into_iter().map(ActivityItem::from))
        .collect();

    items.sort_by(|a, b| b.at.cmp(&a.at));
    items.truncate(limit);
    items
}

pub struct DashboardService {
    store: Arc<dyn DashboardStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn DashboardStore>) -> Self {
        Self { store }
    }

    pub async fn stats(&self, now: DateTime<Utc>) -> AppResult<DashboardStats> {
        let counts = self.store.counts(week_start(now), now.date_naive()).await?;
        let attendance = self.store.recent_attendance(RECENT_PER_STREAM).await?;
        let leaves = self.store.recent_leaves(RECENT_PER_STREAM).await?;

        Ok(DashboardStats {
            total_employees: counts.total_employees,
            clocked_in_now: counts.clocked_in_now,
            active_this_week: counts.active_this_week,
            pending_leaves: counts.pending_leaves,
            on_leave_today: counts.on_leave_today,
            recent_activity: merge_activity(
                attendance,
                leaves,
                (RECENT_PER_STREAM * 2) as usize,
            ),
        })
    }

    pub async fn workforce(&self, now: DateTime<Utc>) -> AppResult<Vec<WorkforceEntry>> {
        let rows = self.store.workforce(now.date_naive()).await?;
        Ok(rows.into_iter().map(WorkforceEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dashboard::{ActivityKind, PresenceStatus, WorkforceRow};
    use crate::model::leave_request::{LeaveStatus, LeaveType};
    use crate::store::dashboard::{DashboardCounts, MockDashboardStore};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn attendance(entry_id: u64, clock_in: &str, clock_out: Option<&str>) -> AttendanceEventRow {
        AttendanceEventRow {
            entry_id,
            user_id: 7,
            full_name: "Jane Doe".into(),
            clock_in: at(clock_in),
            clock_out: clock_out.map(at),
        }
    }

    fn leave(leave_id: u64, status: LeaveStatus, updated_at: &str) -> LeaveEventRow {
        LeaveEventRow {
            leave_id,
            user_id: 8,
            full_name: "Omar Haddad".into(),
            leave_type: LeaveType::Vacation,
            status,
            updated_at: at(updated_at),
        }
    }

    #[test]
    fn activity_is_ordered_by_real_timestamps() {
        let merged = merge_activity(
            vec![
                attendance(31, "2026-03-02T09:00:00Z", Some("2026-03-02T17:30:00Z")),
                attendance(32, "2026-03-02T08:00:00Z", None),
            ],
            vec![
                leave(12, LeaveStatus::Approved, "2026-03-02T12:00:00Z"),
                leave(13, LeaveStatus::Pending, "2026-03-02T18:00:00Z"),
            ],
            10,
        );

        let order: Vec<(ActivityKind, u64)> =
            merged.iter().map(|i| (i.kind, i.reference_id)).collect();
        assert_eq!(
            order,
            vec![
                (ActivityKind::LeaveRequested, 13),
                (ActivityKind::ClockOut, 31),
                (ActivityKind::LeaveApproved, 12),
                (ActivityKind::ClockIn, 32),
            ]
        );
        assert_eq!(merged[1].at, at("2026-03-02T17:30:00Z"));
    }

    #[test]
    fn activity_is_truncated_to_limit() {
        let merged = merge_activity(
            vec![
                attendance(1, "2026-03-02T09:00:00Z", None),
                attendance(2, "2026-03-02T10:00:00Z", None),
            ],
            vec![leave(3, LeaveStatus::Rejected, "2026-03-02T11:00:00Z")],
            2,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].kind, ActivityKind::LeaveRejected);
    }

    #[actix_web::test]
    async fn stats_use_the_current_week_and_day() {
        let mut store = MockDashboardStore::new();
        store
            .expect_counts()
            .withf(|week, today| {
                *week == at("2026-03-02T00:00:00Z") && today.to_string() == "2026-03-04"
            })
            .returning(|_, _| {
                Ok(DashboardCounts {
                    total_employees: 42,
                    clocked_in_now: 17,
                    active_this_week: 35,
                    pending_leaves: 4,
                    on_leave_today: 2,
                })
            });
        store
            .expect_recent_attendance()
            .withf(|limit| *limit == 5)
            .returning(|_| Ok(vec![attendance(31, "2026-03-04T09:00:00Z", None)]));
        store
            .expect_recent_leaves()
            .withf(|limit| *limit == 5)
            .returning(|_| Ok(vec![]));

        let service = DashboardService::new(Arc::new(store));
        let stats = service.stats(at("2026-03-04T10:15:00Z")).await.unwrap();

        assert_eq!(stats.clocked_in_now, 17);
        assert_eq!(stats.active_this_week, 35);
        assert_eq!(stats.recent_activity.len(), 1);
    }

    #[actix_web::test]
    async fn workforce_rows_become_presence_statuses() {
        let mut store = MockDashboardStore::new();
        store.expect_workforce().returning(|_| {
            Ok(vec![
                WorkforceRow {
                    user_id: 1,
                    full_name: "Ana".into(),
                    department: Some("Warehouse".into()),
                    open_since: Some(at("2026-03-04T08:00:00Z")),
                    on_leave: 1,
                },
                WorkforceRow {
                    user_id: 2,
                    full_name: "Ben".into(),
                    department: None,
                    open_since: None,
                    on_leave: 1,
                },
                WorkforceRow {
                    user_id: 3,
                    full_name: "Cleo".into(),
                    department: None,
                    open_since: None,
                    on_leave: 0,
                },
            ])
        });

        let service = DashboardService::new(Arc::new(store));
        let statuses: Vec<PresenceStatus> = service
            .workforce(at("2026-03-04T10:15:00Z"))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.status)
            .collect();

        assert_eq!(
            statuses,
            vec![PresenceStatus::Working, PresenceStatus::OnLeave, PresenceStatus::Off]
        );
    }
}
