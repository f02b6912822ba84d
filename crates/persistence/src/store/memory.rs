//! In-memory planner store.
//!
//! Used for local development and tests. All data lives behind one async
//! mutex. A transaction holds the lock for its whole lifetime and works on a
//! private copy of the state, which replaces the shared state on commit, so
//! writers are fully serialized and an abandoned transaction leaves no trace.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::StoreError;
use domain::models::attendee::sort_roster;
use domain::models::search::keyword_matches;
use domain::models::task::sort_tasks;
use domain::models::{
    AttendanceRecord, AttendanceStatus, Event, EventAggregate, EventId, NewEvent, NewTask,
    NewUser, RosterEntry, SearchFilter, Task, TaskDetail, TaskId, TaskStatus, User, UserId,
};
use domain::store::{Membership, PlannerStore, StoreResult, StoreTx};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    events: BTreeMap<EventId, Event>,
    attendance: BTreeMap<(EventId, UserId), AttendanceRecord>,
    tasks: BTreeMap<TaskId, Task>,
    next_user_id: UserId,
    next_event_id: EventId,
    next_task_id: TaskId,
}

impl MemoryState {
    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    fn summary(&self, id: UserId) -> StoreResult<domain::models::UserSummary> {
        self.users
            .get(&id)
            .map(User::summary)
            .ok_or_else(|| StoreError::Backend(format!("dangling user reference {}", id)))
    }

    fn roster(&self, event_id: EventId) -> StoreResult<Vec<RosterEntry>> {
        let mut roster = self
            .attendance
            .range((event_id, UserId::MIN)..=(event_id, UserId::MAX))
            .map(|(_, record)| {
                let user = self.summary(record.user_id)?;
                Ok(RosterEntry {
                    record: record.clone(),
                    user_name: user.name,
                    user_email: user.email,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        sort_roster(&mut roster);
        Ok(roster)
    }

    fn aggregate(&self, event: &Event) -> StoreResult<EventAggregate> {
        Ok(EventAggregate {
            event: event.clone(),
            organizer: self.summary(event.created_by)?,
            roster: self.roster(event.id)?,
        })
    }

    /// Records held by one user, keyed by event.
    fn records_of(&self, user_id: UserId) -> HashMap<EventId, &AttendanceRecord> {
        self.attendance
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| (r.event_id, r))
            .collect()
    }

    /// The user's records that pass the role filter.
    fn matching_records(&self, user_id: UserId, filter: &SearchFilter) -> HashMap<EventId, &AttendanceRecord> {
        let mut records = self.records_of(user_id);
        if let Some(role) = filter.role {
            records.retain(|_, r| r.role == role);
        }
        records
    }

    fn task_detail(&self, task: &Task) -> StoreResult<TaskDetail> {
        let event = self
            .events
            .get(&task.event_id)
            .ok_or_else(|| StoreError::Backend(format!("dangling event reference {}", task.event_id)))?;
        let assignee = match task.assigned_to {
            Some(id) => Some(self.summary(id)?),
            None => None,
        };

        Ok(TaskDetail {
            task: task.clone(),
            event_title: event.title.clone(),
            assignee,
            creator: self.summary(task.created_by)?,
        })
    }
}

/// Planner store that keeps everything in process memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlannerStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.lock().await;
        if state.user_by_email(&user.email).is_some() {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        state.next_user_id += 1;
        let created = User {
            id: state.next_user_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.user_by_email(email).cloned())
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        let state = self.state.lock().await;
        Ok(state.events.get(&id).cloned())
    }

    async fn load_event(&self, id: EventId) -> StoreResult<Option<EventAggregate>> {
        let state = self.state.lock().await;
        state.events.get(&id).map(|e| state.aggregate(e)).transpose()
    }

    async fn list_organized_events(&self, user_id: UserId) -> StoreResult<Vec<EventAggregate>> {
        let state = self.state.lock().await;
        let mut events: Vec<&Event> = state
            .events
            .values()
            .filter(|e| e.created_by == user_id)
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        events.into_iter().map(|e| state.aggregate(e)).collect()
    }

    async fn list_memberships(&self, user_id: UserId) -> StoreResult<Vec<Membership>> {
        let state = self.state.lock().await;
        let mut records: Vec<&AttendanceRecord> = state.records_of(user_id).into_values().collect();
        records.sort_by(|a, b| {
            b.invited_at
                .cmp(&a.invited_at)
                .then(b.event_id.cmp(&a.event_id))
        });

        records
            .into_iter()
            .filter_map(|r| state.events.get(&r.event_id).map(|e| (r, e)))
            .map(|(record, event)| {
                Ok(Membership {
                    record: record.clone(),
                    aggregate: state.aggregate(event)?,
                })
            })
            .collect()
    }

    async fn find_attendance(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let state = self.state.lock().await;
        Ok(state.attendance.get(&(event_id, user_id)).cloned())
    }

    async fn search_events(
        &self,
        user_id: UserId,
        filter: &SearchFilter,
    ) -> StoreResult<Vec<Membership>> {
        let state = self.state.lock().await;
        let records = state.matching_records(user_id, filter);

        let mut events: Vec<&Event> = state
            .events
            .values()
            .filter(|e| records.contains_key(&e.id))
            .filter(|e| match filter.keyword.as_deref() {
                Some(kw) => keyword_matches(&e.title, kw) || keyword_matches(&e.description, kw),
                None => true,
            })
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        events
            .into_iter()
            .map(|event| {
                Ok(Membership {
                    record: records[&event.id].clone(),
                    aggregate: state.aggregate(event)?,
                })
            })
            .collect()
    }

    async fn search_tasks(
        &self,
        user_id: UserId,
        filter: &SearchFilter,
    ) -> StoreResult<Vec<TaskDetail>> {
        let state = self.state.lock().await;
        let records = state.matching_records(user_id, filter);

        let mut tasks = state
            .tasks
            .values()
            .filter(|t| records.contains_key(&t.event_id))
            .filter(|t| match filter.keyword.as_deref() {
                Some(kw) => keyword_matches(&t.description, kw),
                None => true,
            })
            .map(|t| state.task_detail(t))
            .collect::<StoreResult<Vec<_>>>()?;
        sort_tasks(&mut tasks);
        Ok(tasks)
    }

    async fn list_event_tasks(&self, event_id: EventId) -> StoreResult<Vec<TaskDetail>> {
        let state = self.state.lock().await;
        let mut tasks = state
            .tasks
            .values()
            .filter(|t| t.event_id == event_id)
            .map(|t| state.task_detail(t))
            .collect::<StoreResult<Vec<_>>>()?;
        sort_tasks(&mut tasks);
        Ok(tasks)
    }

    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

/// Exclusive transaction over the in-memory state.
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_event(&mut self, id: EventId) -> StoreResult<Option<Event>> {
        Ok(self.working.events.get(&id).cloned())
    }

    async fn find_attendance(
        &mut self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self.working.attendance.get(&(event_id, user_id)).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.working.user_by_email(email).cloned())
    }

    async fn find_user_by_id(&mut self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn insert_event(&mut self, event: NewEvent) -> StoreResult<Event> {
        if !self.working.users.contains_key(&event.created_by) {
            return Err(StoreError::Backend(format!(
                "unknown creator {}",
                event.created_by
            )));
        }

        self.working.next_event_id += 1;
        let created = Event {
            id: self.working.next_event_id,
            title: event.title,
            description: event.description,
            location: event.location,
            event_date: event.event_date,
            event_time: event.event_time,
            created_by: event.created_by,
            created_at: Utc::now(),
        };
        self.working.events.insert(created.id, created.clone());
        Ok(created)
    }

    async fn insert_attendance(&mut self, record: AttendanceRecord) -> StoreResult<()> {
        let key = (record.event_id, record.user_id);
        if self.working.attendance.contains_key(&key) {
            return Err(StoreError::Conflict(
                "user is already invited to this event".to_string(),
            ));
        }
        if !self.working.events.contains_key(&record.event_id) {
            return Err(StoreError::Backend(format!("unknown event {}", record.event_id)));
        }
        self.working.attendance.insert(key, record);
        Ok(())
    }

    async fn update_attendance_status(
        &mut self,
        event_id: EventId,
        user_id: UserId,
        status: AttendanceStatus,
    ) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self
            .working
            .attendance
            .get_mut(&(event_id, user_id))
            .map(|record| {
                record.status = status;
                record.clone()
            }))
    }

    async fn delete_attendance_for_event(&mut self, event_id: EventId) -> StoreResult<u64> {
        let before = self.working.attendance.len();
        self.working.attendance.retain(|(e, _), _| *e != event_id);
        Ok((before - self.working.attendance.len()) as u64)
    }

    async fn delete_tasks_for_event(&mut self, event_id: EventId) -> StoreResult<u64> {
        let before = self.working.tasks.len();
        self.working.tasks.retain(|_, t| t.event_id != event_id);
        Ok((before - self.working.tasks.len()) as u64)
    }

    async fn delete_event(&mut self, event_id: EventId) -> StoreResult<bool> {
        Ok(self.working.events.remove(&event_id).is_some())
    }

    async fn insert_task(&mut self, task: NewTask) -> StoreResult<Task> {
        if !self.working.events.contains_key(&task.event_id) {
            return Err(StoreError::Backend(format!("unknown event {}", task.event_id)));
        }

        let now = Utc::now();
        self.working.next_task_id += 1;
        let created = Task {
            id: self.working.next_task_id,
            event_id: task.event_id,
            description: task.description,
            assigned_to: task.assigned_to,
            status: TaskStatus::Pending,
            due_date: task.due_date,
            created_by: task.created_by,
            created_at: now,
            updated_at: now,
        };
        self.working.tasks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_task(&mut self, task_id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.working.tasks.get(&task_id).cloned())
    }

    async fn update_task_status(
        &mut self,
        task_id: TaskId,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Task>> {
        Ok(self.working.tasks.get_mut(&task_id).map(|task| {
            task.status = status;
            task.updated_at = updated_at;
            task.clone()
        }))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
