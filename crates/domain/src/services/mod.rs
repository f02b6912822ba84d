//! Domain services for the event planner.
//!
//! Services contain business logic that operates on domain models.

pub mod access;
pub mod planner;

pub use planner::PlannerService;
