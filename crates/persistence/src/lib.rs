//! Persistence layer for the Event Planner backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - PostgreSQL and in-memory implementations of the planner store

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use store::{MemoryStore, PgStore};
