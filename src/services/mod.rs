//! Business rules, one service per resource.
//!
//! Services own validation and authorization decisions that depend on data;
//! persistence goes through the store traits so every service can be tested
//! against mocks.

pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod dashboard;
pub mod leave;
pub mod schedule;
pub mod user;

use actix_web::web::{self, Data};
use sqlx::MySqlPool;
use std::sync::Arc;

pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use leave::LeaveService;
pub use schedule::ScheduleService;
pub use user::UserService;

use crate::config::Config;
use crate::store::{
    MySqlAttendanceStore, MySqlDashboardStore, MySqlLeaveStore, MySqlScheduleStore,
    MySqlTokenStore, MySqlUserStore, UserStore,
};

/// Every service, wrapped for `App::app_data`. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct Services {
    pub auth: Data<AuthService>,
    pub attendance: Data<AttendanceService>,
    pub leave: Data<LeaveService>,
    pub schedule: Data<ScheduleService>,
    pub dashboard: Data<DashboardService>,
    pub users: Data<UserService>,
}

impl Services {
    pub fn from_pool(pool: MySqlPool, config: &Config) -> Self {
        let users: Arc<dyn UserStore> = Arc::new(MySqlUserStore::new(pool.clone()));

        Self {
            auth: Data::new(AuthService::new(
                users.clone(),
                Arc::new(MySqlTokenStore::new(pool.clone())),
                config.jwt_secret.clone(),
                config.access_token_ttl,
                config.refresh_token_ttl,
            )),
            attendance: Data::new(AttendanceService::new(
                Arc::new(MySqlAttendanceStore::new(pool.clone())),
                config.history_limit,
            )),
            leave: Data::new(LeaveService::new(
                Arc::new(MySqlLeaveStore::new(pool.clone())),
                users.clone(),
            )),
            schedule: Data::new(ScheduleService::new(Arc::new(MySqlScheduleStore::new(
                pool.clone(),
            )))),
            dashboard: Data::new(DashboardService::new(Arc::new(MySqlDashboardStore::new(
                pool,
            )))),
            users: Data::new(UserService::new(users, config.default_annual_leave)),
        }
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.attendance.clone())
            .app_data(self.leave.clone())
            .app_data(self.schedule.clone())
            .app_data(self.dashboard.clone())
            .app_data(self.users.clone());
    }
}
