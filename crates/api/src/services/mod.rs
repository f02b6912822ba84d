//! Application services that sit beside the planner engine.

pub mod auth;

pub use auth::AuthService;
