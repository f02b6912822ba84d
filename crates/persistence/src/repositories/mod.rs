//! Repository implementations for database operations.

pub mod attendee;
pub mod event;
pub mod task;
pub mod user;

pub use attendee::AttendeeRepository;
pub use event::{EventInput, EventRepository};
pub use task::{TaskInput, TaskRepository};
pub use user::UserRepository;
