//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod attendee;
pub mod event;
pub mod task;
pub mod user;

pub use attendee::{AttendanceStatusDb, AttendeeEntity, AttendeeRoleDb, RosterEntity};
pub use event::{EventEntity, EventWithOrganizerEntity, MembershipEntity};
pub use task::{TaskDetailEntity, TaskEntity, TaskStatusDb};
pub use user::UserEntity;
