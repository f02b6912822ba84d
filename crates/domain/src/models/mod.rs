//! Domain models for the event planner.

pub mod attendee;
pub mod event;
pub mod search;
pub mod task;
pub mod user;

pub use attendee::{AttendanceRecord, AttendanceStatus, AttendeeRole, RosterEntry};
pub use event::{Event, EventAggregate, EventId, NewEvent};
pub use search::{SearchFilter, SearchType};
pub use task::{NewTask, Task, TaskDetail, TaskId, TaskStatus};
pub use user::{NewUser, User, UserId, UserSummary};
