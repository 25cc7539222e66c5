use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg(test)]
use mockall::automock;

use crate::error::{AppError, AppResult};
use crate::model::leave_request::{
    LeaveRequest, LeaveStatus, NewLeave, PendingLeave, StatusTransition,
};

const LEAVE_COLUMNS: &str = "id, user_id, reviewer_id, leave_type, status, start_date, end_date, \
                             reason, deducted_days, created_at, updated_at";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn create(&self, leave: NewLeave) -> AppResult<LeaveRequest>;

    async fn find(&self, leave_id: u64) -> AppResult<Option<LeaveRequest>>;

    /// A user's requests, newest first
    async fn list_for_user(&self, user_id: u64) -> AppResult<Vec<LeaveRequest>>;

    /// Requests in the given status with requester names, oldest first
    async fn list_by_status(&self, status: LeaveStatus) -> AppResult<Vec<PendingLeave>>;

    /// Applies a status change and its balance effect in one transaction.
    ///
    /// Fails with `Conflict` when the request no longer has `transition.from`,
    /// and with `InsufficientBalance` when the deduction would overdraw.
    async fn apply_transition(&self, transition: StatusTransition) -> AppResult<LeaveRequest>;
}

pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    async fn create(&self, leave: NewLeave) -> AppResult<LeaveRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (user_id, leave_type, status, start_date, end_date, reason)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(leave.user_id)
        .bind(leave.leave_type.as_ref())
        .bind(LeaveStatus::Pending.as_ref())
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(&leave.reason)
        .execute(&self.pool)
        .await?;

        self.find(result.last_insert_id())
            .await?
            .ok_or_else(|| AppError::internal("leave request vanished after insert"))
    }

    async fn find(&self, leave_id: u64) -> AppResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", LEAVE_COLUMNS);
        let leave = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(leave_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(leave)
    }

    async fn list_for_user(&self, user_id: u64) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {} FROM leave_requests WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            LEAVE_COLUMNS
        );
        let leaves = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(leaves)
    }

    async fn list_by_status(&self, status: LeaveStatus) -> AppResult<Vec<PendingLeave>> {
        let leaves = sqlx::query_as::<_, PendingLeave>(
            r#"
            SELECT lr.id, lr.user_id, u.full_name, lr.leave_type,
                   lr.start_date, lr.end_date, lr.reason, lr.created_at
            FROM leave_requests lr
            JOIN users u ON u.id = lr.user_id
            WHERE lr.status = ?
            ORDER BY lr.created_at ASC, lr.id ASC
            "#,
        )
        .bind(status.as_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(leaves)
    }

    async fn apply_transition(&self, t: StatusTransition) -> AppResult<LeaveRequest> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, reviewer_id = ?, deducted_days = ?
            WHERE id = ?
            AND status = ?
            AND deducted_days = ?
            "#,
        )
        .bind(t.to.as_ref())
        .bind(t.reviewer_id)
        .bind(t.deduct)
        .bind(t.leave_id)
        .bind(t.from.as_ref())
        // the refund is exactly what the current state recorded
        .bind(t.refund)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // dropping tx rolls back
            return Err(AppError::conflict(
                "Leave request was changed by another reviewer",
            ));
        }

        if t.refund > 0 {
            sqlx::query("UPDATE users SET leave_balance = leave_balance + ? WHERE id = ?")
                .bind(t.refund)
                .bind(t.user_id)
                .execute(&mut *tx)
                .await?;
        }

        if t.deduct > 0 {
            let deducted = sqlx::query(
                r#"
                UPDATE users
                SET leave_balance = leave_balance - ?
                WHERE id = ?
                AND leave_balance >= ?
                "#,
            )
            .bind(t.deduct)
            .bind(t.user_id)
            .bind(t.deduct)
            .execute(&mut *tx)
            .await?;

            if deducted.rows_affected() == 0 {
                let available: i32 =
                    sqlx::query_scalar("SELECT leave_balance FROM users WHERE id = ?")
                        .bind(t.user_id)
                        .fetch_one(&mut *tx)
                        .await?;
                return Err(AppError::InsufficientBalance {
                    requested: t.deduct,
                    available,
                });
            }
        }

        tx.commit().await?;

        self.find(t.leave_id)
            .await?
            .ok_or(AppError::NotFound("Leave request"))
    }
}
