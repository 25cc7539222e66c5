pub mod dashboard;
pub mod department;
pub mod leave_request;
pub mod role;
pub mod schedule;
pub mod time_entry;
pub mod user;
