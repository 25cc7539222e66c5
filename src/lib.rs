//! Workforce time tracking and leave management service.
//!
//! Employees clock in and out, request leave and see their shifts; managers
//! review leave, plan schedules and watch a live dashboard; admins manage
//! accounts. The HTTP layer lives in `api` and `auth`, business rules in
//! `services`, SQL in `store`.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;
