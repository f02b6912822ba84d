//! Storage interface for the planner core.
//!
//! The workflow engine is written against these traits only. A backend is
//! chosen once at startup and injected as `Arc<dyn PlannerStore>`.
//!
//! Reads on [`PlannerStore`] each observe a single consistent snapshot.
//! Multi-step writes go through a [`StoreTx`] obtained from
//! [`PlannerStore::begin`]; nothing written through it is visible to other
//! callers until [`StoreTx::commit`] succeeds, and dropping it without
//! committing discards every write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::{
    AttendanceRecord, AttendanceStatus, Event, EventAggregate, EventId, NewEvent, NewTask,
    NewUser, SearchFilter, Task, TaskDetail, TaskId, TaskStatus, User, UserId,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// An event seen through one member's attendance record.
#[derive(Debug, Clone)]
pub struct Membership {
    pub record: AttendanceRecord,
    pub aggregate: EventAggregate,
}

#[async_trait]
pub trait PlannerStore: Send + Sync {
    /// Checks that the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts a user. A duplicate email yields [`StoreError::Conflict`].
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>>;

    /// Loads an event with its organizer and roster (organizers first, then by invitation time).
    async fn load_event(&self, id: EventId) -> StoreResult<Option<EventAggregate>>;

    /// Events created by `user_id`, newest first.
    async fn list_organized_events(&self, user_id: UserId) -> StoreResult<Vec<EventAggregate>>;

    /// Every event `user_id` holds a record for, most recent invitation first.
    async fn list_memberships(&self, user_id: UserId) -> StoreResult<Vec<Membership>>;

    async fn find_attendance(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Events `user_id` holds a matching record for, newest first.
    async fn search_events(
        &self,
        user_id: UserId,
        filter: &SearchFilter,
    ) -> StoreResult<Vec<Membership>>;

    /// Tasks on events `user_id` holds a matching record for, ordered by due date
    /// (undated last) and then newest first.
    async fn search_tasks(&self, user_id: UserId, filter: &SearchFilter)
        -> StoreResult<Vec<TaskDetail>>;

    /// Tasks of one event, in the same order as search results.
    async fn list_event_tasks(&self, event_id: EventId) -> StoreResult<Vec<TaskDetail>>;

    /// Starts a write transaction.
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;
}

/// A write transaction.
#[async_trait]
pub trait StoreTx: Send {
    async fn find_event(&mut self, id: EventId) -> StoreResult<Option<Event>>;

    async fn find_attendance(
        &mut self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<AttendanceRecord>>;

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&mut self, id: UserId) -> StoreResult<Option<User>>;

    async fn insert_event(&mut self, event: NewEvent) -> StoreResult<Event>;

    /// Inserts a record. An existing (event, user) pair yields [`StoreError::Conflict`].
    async fn insert_attendance(&mut self, record: AttendanceRecord) -> StoreResult<()>;

    /// Updates the status of an existing record and returns it.
    async fn update_attendance_status(
        &mut self,
        event_id: EventId,
        user_id: UserId,
        status: AttendanceStatus,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Returns the number of records removed.
    async fn delete_attendance_for_event(&mut self, event_id: EventId) -> StoreResult<u64>;

    /// Returns the number of tasks removed.
    async fn delete_tasks_for_event(&mut self, event_id: EventId) -> StoreResult<u64>;

    /// Returns true when the event existed.
    async fn delete_event(&mut self, event_id: EventId) -> StoreResult<bool>;

    async fn insert_task(&mut self, task: NewTask) -> StoreResult<Task>;

    async fn find_task(&mut self, task_id: TaskId) -> StoreResult<Option<Task>>;

    async fn update_task_status(
        &mut self,
        task_id: TaskId,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Task>>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
