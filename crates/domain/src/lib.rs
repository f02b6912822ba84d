//! Domain layer for the Event Planner backend.
//!
//! This crate contains:
//! - Domain models (User, Event, AttendanceRecord, Task) and wire views
//! - The storage interface implemented by the persistence crate
//! - The access-control and workflow engine
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{PlannerError, PlannerResult, StoreError};
pub use services::PlannerService;
pub use store::{Membership, PlannerStore, StoreTx};
