//! Task entities (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Task, TaskDetail, TaskStatus, UserSummary};
use sqlx::FromRow;

/// Database enum for task_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatusDb {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl From<TaskStatusDb> for TaskStatus {
    fn from(db_status: TaskStatusDb) -> Self {
        match db_status {
            TaskStatusDb::Pending => TaskStatus::Pending,
            TaskStatusDb::InProgress => TaskStatus::InProgress,
            TaskStatusDb::Completed => TaskStatus::Completed,
            TaskStatusDb::Cancelled => TaskStatus::Cancelled,
        }
    }
}

impl From<TaskStatus> for TaskStatusDb {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pending => TaskStatusDb::Pending,
            TaskStatus::InProgress => TaskStatusDb::InProgress,
            TaskStatus::Completed => TaskStatusDb::Completed,
            TaskStatus::Cancelled => TaskStatusDb::Cancelled,
        }
    }
}

/// Database row mapping for the tasks table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskEntity {
    pub id: i64,
    pub event_id: i64,
    pub description: String,
    pub assigned_to: Option<i64>,
    pub status: TaskStatusDb,
    pub due_date: Option<NaiveDate>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskEntity> for Task {
    fn from(entity: TaskEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            description: entity.description,
            assigned_to: entity.assigned_to,
            status: entity.status.into(),
            due_date: entity.due_date,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Task row joined with its event title, assignee and creator.
#[derive(Debug, Clone, FromRow)]
pub struct TaskDetailEntity {
    #[sqlx(flatten)]
    pub task: TaskEntity,
    pub event_title: String,
    pub assignee_name: Option<String>,
    pub assignee_email: Option<String>,
    pub creator_name: String,
    pub creator_email: String,
}

impl From<TaskDetailEntity> for TaskDetail {
    fn from(entity: TaskDetailEntity) -> Self {
        let assignee = match (entity.task.assigned_to, entity.assignee_name, entity.assignee_email) {
            (Some(id), Some(name), Some(email)) => Some(UserSummary { id, name, email }),
            _ => None,
        };
        let creator = UserSummary {
            id: entity.task.created_by,
            name: entity.creator_name,
            email: entity.creator_email,
        };

        Self {
            task: entity.task.into(),
            event_title: entity.event_title,
            assignee,
            creator,
        }
    }
}
