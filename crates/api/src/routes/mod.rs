//! HTTP route handlers.

pub mod attendance;
pub mod auth;
pub mod events;
pub mod health;
pub mod search;
pub mod tasks;
