//! Task repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgExecutor;

use crate::entities::{AttendeeRoleDb, TaskDetailEntity, TaskEntity, TaskStatusDb};
use crate::metrics::QueryTimer;

/// Queries over the tasks table.
pub struct TaskRepository;

/// Column values for a new task row.
pub struct TaskInput<'a> {
    pub event_id: i64,
    pub description: &'a str,
    pub assigned_to: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub created_by: i64,
}

impl TaskRepository {
    /// Insert a task with status pending.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        input: TaskInput<'_>,
    ) -> Result<TaskEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_task");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            INSERT INTO tasks (event_id, description, assigned_to, due_date, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_id, description, assigned_to, status, due_date,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(input.event_id)
        .bind(input.description)
        .bind(input.assigned_to)
        .bind(input.due_date)
        .bind(input.created_by)
        .fetch_one(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Find a task by id.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
    ) -> Result<Option<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_task_by_id");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            SELECT id, event_id, description, assigned_to, status, due_date,
                   created_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Set a task's status and bump updated_at.
    pub async fn update_status<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
        status: TaskStatusDb,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_task_status");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, event_id, description, assigned_to, status, due_date,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(updated_at)
        .fetch_optional(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Tasks of one event, by due date (undated last) then newest first.
    pub async fn list_for_event<'e, E: PgExecutor<'e>>(
        executor: E,
        event_id: i64,
    ) -> Result<Vec<TaskDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_tasks");
        let result = sqlx::query_as::<_, TaskDetailEntity>(
            r#"
            SELECT t.id, t.event_id, t.description, t.assigned_to, t.status, t.due_date,
                   t.created_by, t.created_at, t.updated_at,
                   e.title AS event_title,
                   a.name AS assignee_name, a.email AS assignee_email,
                   c.name AS creator_name, c.email AS creator_email
            FROM tasks t
            JOIN events e ON e.id = t.event_id
            JOIN users c ON c.id = t.created_by
            LEFT JOIN users a ON a.id = t.assigned_to
            WHERE t.event_id = $1
            ORDER BY t.due_date ASC NULLS LAST, t.created_at DESC, t.id DESC
            "#,
        )
        .bind(event_id)
        .fetch_all(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Search tasks on events a user holds a record for.
    pub async fn search<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i64,
        keyword: Option<&str>,
        role: Option<AttendeeRoleDb>,
    ) -> Result<Vec<TaskDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("search_tasks");
        let result = sqlx::query_as::<_, TaskDetailEntity>(
            r#"
            SELECT t.id, t.event_id, t.description, t.assigned_to, t.status, t.due_date,
                   t.created_by, t.created_at, t.updated_at,
                   e.title AS event_title,
                   a.name AS assignee_name, a.email AS assignee_email,
                   c.name AS creator_name, c.email AS creator_email
            FROM tasks t
            JOIN events e ON e.id = t.event_id
            JOIN event_attendees ea ON ea.event_id = t.event_id AND ea.user_id = $1
            JOIN users c ON c.id = t.created_by
            LEFT JOIN users a ON a.id = t.assigned_to
            WHERE ($2::attendee_role IS NULL OR ea.role = $2)
              AND ($3::text IS NULL OR strpos(lower(t.description), lower($3)) > 0)
            ORDER BY t.due_date ASC NULLS LAST, t.created_at DESC, t.id DESC
            "#,
        )
        .bind(user_id)
        .bind(role)
        .bind(keyword)
        .fetch_all(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Delete every task of an event. Returns the number of rows removed.
    pub async fn delete_for_event<'e, E: PgExecutor<'e>>(
        executor: E,
        event_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_event_tasks");
        let result = sqlx::query("DELETE FROM tasks WHERE event_id = $1")
            .bind(event_id)
            .execute(executor)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected())
    }
}
