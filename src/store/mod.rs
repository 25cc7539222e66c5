//! Persistence seams.
//!
//! Services only see the traits; the MySQL implementations sit next to them.
//! Statements that enforce an invariant (one open entry per user, a single
//! balance deduction per approval) are written as atomic conditional
//! statements rather than read-then-write pairs.

pub mod attendance;
pub mod dashboard;
pub mod leave;
pub mod schedule;
pub mod token;
pub mod user;

pub use attendance::{AttendanceStore, MySqlAttendanceStore};
pub use dashboard::{DashboardStore, MySqlDashboardStore};
pub use leave::{LeaveStore, MySqlLeaveStore};
pub use schedule::{MySqlScheduleStore, ScheduleStore};
pub use token::{MySqlTokenStore, TokenStore};
pub use user::{MySqlUserStore, UserStore};
