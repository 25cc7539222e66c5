use std::sync::Arc;
use tracing::{info, instrument};

use super::calendar::inclusive_days;
use crate::error::{AppError, AppResult};
use crate::model::leave_request::{
    LeaveRequest, LeaveStatus, LeaveType, NewLeave, PendingLeave, StatusTransition,
};
use crate::model::role::Role;
use crate::store::{LeaveStore, UserStore};

/// Works out the balance effect of moving `leave` to `to`.
///
/// `None` means the request already has that status and nothing changes.
/// Entering `approved` deducts the inclusive day count (nothing for unpaid
/// leave); leaving `approved` gives back whatever that approval deducted, so
/// a reject-then-reapprove cycle never charges twice.
pub fn plan_transition(
    leave: &LeaveRequest,
    to: LeaveStatus,
    reviewer_id: u64,
    balance: i32,
) -> AppResult<Option<StatusTransition>> {
    if leave.status == to {
        return Ok(None);
    }

    let (deduct, refund) = match (leave.status, to) {
        (LeaveStatus::Approved, _) => (0, leave.deducted_days),
        (_, LeaveStatus::Approved) => {
            let days = if leave.leave_type.is_paid() {
                inclusive_days(leave.start_date, leave.end_date)
            } else {
                0
            };
            if days > balance {
                return Err(AppError::InsufficientBalance {
                    requested: days,
                    available: balance,
                });
            }
            (days, 0)
        }
        _ => (0, 0),
    };

    Ok(Some(StatusTransition {
        leave_id: leave.id,
        user_id: leave.user_id,
        reviewer_id,
        from: leave.status,
        to,
        deduct,
        refund,
    }))
}

pub struct LeaveService {
    leaves: Arc<dyn LeaveStore>,
    users: Arc<dyn UserStore>,
}

impl LeaveService {
    pub fn new(leaves: Arc<dyn LeaveStore>, users: Arc<dyn UserStore>) -> Self {
        Self { leaves, users }
    }

    /// New requests always start out pending.
    pub async fn create(&self, leave: NewLeave) -> AppResult<LeaveRequest> {
        if leave.start_date > leave.end_date {
            return Err(AppError::validation("start_date cannot be after end_date"));
        }

        let created = self.leaves.create(leave).await?;
        info!(leave_id = created.id, user_id = created.user_id, "Leave request submitted");
        Ok(created)
    }

    pub async fn mine(&self, user_id: u64) -> AppResult<Vec<LeaveRequest>> {
        self.leaves.list_for_user(user_id).await
    }

    /// Pending requests awaiting review; sick leave needs no approval and is left out.
    pub async fn pending(&self) -> AppResult<Vec<PendingLeave>> {
        let pending = self.leaves.list_by_status(LeaveStatus::Pending).await?;
        Ok(pending
            .into_iter()
            .filter(|l| l.leave_type != LeaveType::Sick)
            .collect())
    }

    /// Owners see their own requests; reviewers see all.
    pub async fn get(&self, leave_id: u64, requester_id: u64, role: Role) -> AppResult<LeaveRequest> {
        let leave = self
            .leaves
            .find(leave_id)
            .await?
            .ok_or(AppError::NotFound("Leave request"))?;

        if leave.user_id != requester_id && !role.is_supervisor() {
            return Err(AppError::Forbidden);
        }
        Ok(leave)
    }

    #[instrument(name = "leave_update_status", skip(self))]
    pub async fn update_status(
        &self,
        leave_id: u64,
        to: LeaveStatus,
        reviewer_id: u64,
    ) -> AppResult<LeaveRequest> {
        let leave = self
            .leaves
            .find(leave_id)
            .await?
            .ok_or(AppError::NotFound("Leave request"))?;

        let owner = self
            .users
            .find_by_id(leave.user_id)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        let Some(transition) = plan_transition(&leave, to, reviewer_id, owner.leave_balance)? else {
            return Ok(leave);
        };

        let (deduct, refund) = (transition.deduct, transition.refund);
        let updated = self.leaves.apply_transition(transition).await?;

        info!(
            user_id = updated.user_id,
            status = %updated.status,
            deducted = deduct,
            refunded = refund,
            "Leave status changed"
        );
        Ok(updated)
    }
}
