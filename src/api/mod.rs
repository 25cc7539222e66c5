pub mod admin;
pub mod attendance;
pub mod department;
pub mod leave_request;
pub mod schedule;
pub mod user;
