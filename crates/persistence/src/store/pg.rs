//! PostgreSQL-backed planner store.

use std::collections::HashMap;

use async_trait::async_trait;
use metrics::gauge;
use chrono::{DateTime, Utc};
use domain::error::StoreError;
use domain::models::{
    AttendanceRecord, AttendanceStatus, Event, EventAggregate, EventId, NewEvent, NewTask,
    NewUser, RosterEntry, SearchFilter, Task, TaskDetail, TaskId, TaskStatus, User, UserId,
};
use domain::store::{Membership, PlannerStore, StoreResult, StoreTx};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;

use crate::entities::{
    AttendanceStatusDb, AttendeeRoleDb, EventWithOrganizerEntity, MembershipEntity, TaskStatusDb,
};
use crate::metrics::{record_transaction, TxOutcome};
use crate::repositories::{
    AttendeeRepository, EventInput, EventRepository, TaskInput, TaskRepository, UserRepository,
};

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for serialization_failure.
const SERIALIZATION_FAILURE: &str = "40001";

/// Maps a driver error onto the storage error taxonomy.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::Conflict(db_err.message().to_string()),
            Some(SERIALIZATION_FAILURE) => {
                return StoreError::Conflict("concurrent update, please retry".to_string())
            }
            _ => {}
        }
    }
    StoreError::Backend(err.to_string())
}

/// Planner store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Refreshed on every liveness check.
    fn record_pool_gauges(&self) {
        let size = self.pool.size() as f64;
        let idle = self.pool.num_idle() as f64;
        gauge!("planner_store_connections_total").set(size);
        gauge!("planner_store_connections_idle").set(idle);
        gauge!("planner_store_connections_active").set((size - idle).max(0.0));
    }

    /// Opens a read-only snapshot for reads that need several statements.
    async fn snapshot(&self) -> StoreResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(tx)
    }
}

/// Loads rosters for the given events and groups them by event id.
async fn rosters_by_event(
    conn: &mut PgConnection,
    event_ids: &[i64],
) -> StoreResult<HashMap<EventId, Vec<RosterEntry>>> {
    let mut grouped: HashMap<EventId, Vec<RosterEntry>> = HashMap::new();
    if event_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = AttendeeRepository::list_rosters(conn, event_ids)
        .await
        .map_err(map_sqlx_error)?;
    for row in rows {
        grouped.entry(row.event_id).or_default().push(row.into());
    }
    Ok(grouped)
}

async fn aggregates(
    conn: &mut PgConnection,
    rows: Vec<EventWithOrganizerEntity>,
) -> StoreResult<Vec<EventAggregate>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.event.id).collect();
    let mut rosters = rosters_by_event(conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let roster = rosters.remove(&row.event.id).unwrap_or_default();
            let (event, organizer) = row.into_parts();
            EventAggregate {
                event,
                organizer,
                roster,
            }
        })
        .collect())
}

async fn memberships(
    conn: &mut PgConnection,
    rows: Vec<MembershipEntity>,
) -> StoreResult<Vec<Membership>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.event.event.id).collect();
    let rosters = rosters_by_event(conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let record = row.record();
            let roster = rosters.get(&record.event_id).cloned().unwrap_or_default();
            let (event, organizer) = row.event.into_parts();
            Membership {
                record,
                aggregate: EventAggregate {
                    event,
                    organizer,
                    roster,
                },
            }
        })
        .collect())
}

#[async_trait]
impl PlannerStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        self.record_pool_gauges();
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        UserRepository::create(&self.pool, &user.name, &user.email, &user.password_hash)
            .await
            .map(User::from)
            .map_err(|e| match map_sqlx_error(e) {
                StoreError::Conflict(_) => StoreError::Conflict("email already registered".into()),
                other => other,
            })
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = UserRepository::find_by_email(&self.pool, email)
            .await
            .map_err(map_sqlx_error)?;
        Ok(user.map(User::from))
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let user = UserRepository::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(user.map(User::from))
    }

    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        let event = EventRepository::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(event.map(Event::from))
    }

    async fn load_event(&self, id: EventId) -> StoreResult<Option<EventAggregate>> {
        let mut tx = self.snapshot().await?;
        let row = EventRepository::find_with_organizer(&mut *tx, id)
            .await
            .map_err(map_sqlx_error)?;

        let aggregate = match row {
            Some(row) => aggregates(&mut tx, vec![row]).await?.pop(),
            None => None,
        };
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(aggregate)
    }

    async fn list_organized_events(&self, user_id: UserId) -> StoreResult<Vec<EventAggregate>> {
        let mut tx = self.snapshot().await?;
        let rows = EventRepository::list_by_creator(&mut *tx, user_id)
            .await
            .map_err(map_sqlx_error)?;
        let events = aggregates(&mut tx, rows).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(events)
    }

    async fn list_memberships(&self, user_id: UserId) -> StoreResult<Vec<Membership>> {
        let mut tx = self.snapshot().await?;
        let rows = EventRepository::list_memberships(&mut *tx, user_id)
            .await
            .map_err(map_sqlx_error)?;
        let result = memberships(&mut tx, rows).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(result)
    }

    async fn find_attendance(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let record = AttendeeRepository::find(&self.pool, event_id, user_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(record.map(AttendanceRecord::from))
    }

    async fn search_events(
        &self,
        user_id: UserId,
        filter: &SearchFilter,
    ) -> StoreResult<Vec<Membership>> {
        let mut tx = self.snapshot().await?;
        let rows = EventRepository::search(
            &mut *tx,
            user_id,
            filter.keyword.as_deref(),
            filter.role.map(AttendeeRoleDb::from),
        )
        .await
        .map_err(map_sqlx_error)?;
        let result = memberships(&mut tx, rows).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(result)
    }

    async fn search_tasks(
        &self,
        user_id: UserId,
        filter: &SearchFilter,
    ) -> StoreResult<Vec<TaskDetail>> {
        let rows = TaskRepository::search(
            &self.pool,
            user_id,
            filter.keyword.as_deref(),
            filter.role.map(AttendeeRoleDb::from),
        )
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(TaskDetail::from).collect())
    }

    async fn list_event_tasks(&self, event_id: EventId) -> StoreResult<Vec<TaskDetail>> {
        let rows = TaskRepository::list_for_event(&self.pool, event_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(TaskDetail::from).collect())
    }

    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        debug!("Began serializable transaction");
        Ok(Box::new(PgTx { tx }))
    }
}

/// A serializable write transaction.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn find_event(&mut self, id: EventId) -> StoreResult<Option<Event>> {
        let event = EventRepository::find_by_id(&mut *self.tx, id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(event.map(Event::from))
    }

    async fn find_attendance(
        &mut self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let record = AttendeeRepository::find(&mut *self.tx, event_id, user_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(record.map(AttendanceRecord::from))
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        let user = UserRepository::find_by_email(&mut *self.tx, email)
            .await
            .map_err(map_sqlx_error)?;
        Ok(user.map(User::from))
    }

    async fn find_user_by_id(&mut self, id: UserId) -> StoreResult<Option<User>> {
        let user = UserRepository::find_by_id(&mut *self.tx, id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(user.map(User::from))
    }

    async fn insert_event(&mut self, event: NewEvent) -> StoreResult<Event> {
        let input = EventInput {
            title: &event.title,
            description: &event.description,
            location: &event.location,
            event_date: event.event_date,
            event_time: event.event_time,
            created_by: event.created_by,
        };
        EventRepository::create(&mut *self.tx, input)
            .await
            .map(Event::from)
            .map_err(map_sqlx_error)
    }

    async fn insert_attendance(&mut self, record: AttendanceRecord) -> StoreResult<()> {
        AttendeeRepository::create(
            &mut *self.tx,
            record.event_id,
            record.user_id,
            record.role.into(),
            record.status.into(),
            record.invited_at,
        )
        .await
        .map_err(|e| match map_sqlx_error(e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict("user is already invited to this event".into())
            }
            other => other,
        })
    }

    async fn update_attendance_status(
        &mut self,
        event_id: EventId,
        user_id: UserId,
        status: AttendanceStatus,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let record = AttendeeRepository::update_status(
            &mut *self.tx,
            event_id,
            user_id,
            AttendanceStatusDb::from(status),
        )
        .await
        .map_err(map_sqlx_error)?;
        Ok(record.map(AttendanceRecord::from))
    }

    async fn delete_attendance_for_event(&mut self, event_id: EventId) -> StoreResult<u64> {
        AttendeeRepository::delete_for_event(&mut *self.tx, event_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_tasks_for_event(&mut self, event_id: EventId) -> StoreResult<u64> {
        TaskRepository::delete_for_event(&mut *self.tx, event_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_event(&mut self, event_id: EventId) -> StoreResult<bool> {
        let removed = EventRepository::delete(&mut *self.tx, event_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(removed > 0)
    }

    async fn insert_task(&mut self, task: NewTask) -> StoreResult<Task> {
        let input = TaskInput {
            event_id: task.event_id,
            description: &task.description,
            assigned_to: task.assigned_to,
            due_date: task.due_date,
            created_by: task.created_by,
        };
        TaskRepository::create(&mut *self.tx, input)
            .await
            .map(Task::from)
            .map_err(map_sqlx_error)
    }

    async fn find_task(&mut self, task_id: TaskId) -> StoreResult<Option<Task>> {
        let task = TaskRepository::find_by_id(&mut *self.tx, task_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(task.map(Task::from))
    }

    async fn update_task_status(
        &mut self,
        task_id: TaskId,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Task>> {
        let task = TaskRepository::update_status(
            &mut *self.tx,
            task_id,
            TaskStatusDb::from(status),
            updated_at,
        )
        .await
        .map_err(map_sqlx_error)?;
        Ok(task.map(Task::from))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let result = self.tx.commit().await.map_err(map_sqlx_error);
        record_transaction(match &result {
            Ok(()) => TxOutcome::Committed,
            Err(StoreError::Conflict(_)) => TxOutcome::Conflicted,
            Err(_) => TxOutcome::Failed,
        });
        result
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        record_transaction(TxOutcome::RolledBack);
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}
