//! Task board models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use shared::validation::format_calendar_date;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::event::EventId;
use super::user::{UserId, UserSummary};

/// Numeric task identifier.
pub type TaskId = i64;

/// Progress of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A unit of work scoped to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub event_id: EventId,
    pub description: String,
    pub assigned_to: Option<UserId>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub event_id: EventId,
    pub description: String,
    pub assigned_to: Option<UserId>,
    pub due_date: Option<NaiveDate>,
    pub created_by: UserId,
}

/// A task joined with its event title and the people it references.
#[derive(Debug, Clone)]
pub struct TaskDetail {
    pub task: Task,
    pub event_title: String,
    pub assignee: Option<UserSummary>,
    pub creator: UserSummary,
}

/// Orders tasks by due date (undated last), newest first within a date, then by id.
pub fn sort_tasks(tasks: &mut [TaskDetail]) {
    tasks.sort_by(|a, b| {
        let due = |t: &TaskDetail| (t.task.due_date.is_none(), t.task.due_date);
        due(a)
            .cmp(&due(b))
            .then(b.task.created_at.cmp(&a.task.created_at))
            .then(b.task.id.cmp(&a.task.id))
    });
}

/// Request payload for creating a task.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(
        length(min = 1, max = 2000, message = "Description must be between 1 and 2000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub description: String,

    #[validate(email(message = "Invalid assignee email format"))]
    pub assignee_email: Option<String>,

    #[validate(custom(function = "shared::validation::validate_calendar_date"))]
    pub due_date: Option<String>,
}

/// Request payload for moving a task to a new status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

fn serialize_due_date<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => s.serialize_str(&format_calendar_date(date)),
        None => s.serialize_none(),
    }
}

/// Task as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: TaskId,
    pub event_id: EventId,
    pub event_title: String,
    pub description: String,
    pub assigned_to: Option<UserId>,
    pub assignee: Option<UserSummary>,
    pub status: TaskStatus,
    #[serde(serialize_with = "serialize_due_date")]
    pub due_date: Option<NaiveDate>,
    pub created_by: UserId,
    pub creator: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskDetail> for TaskView {
    fn from(detail: TaskDetail) -> Self {
        let TaskDetail {
            task,
            event_title,
            assignee,
            creator,
        } = detail;

        Self {
            id: task.id,
            event_id: task.event_id,
            event_title,
            description: task.description,
            assigned_to: task.assigned_to,
            assignee,
            status: task.status,
            due_date: task.due_date,
            created_by: task.created_by,
            creator,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn detail(id: TaskId, due: Option<(i32, u32, u32)>, age_secs: i64) -> TaskDetail {
        let now = DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let creator = UserSummary {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        TaskDetail {
            task: Task {
                id,
                event_id: 1,
                description: format!("task {}", id),
                assigned_to: None,
                status: TaskStatus::Pending,
                due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                created_by: 1,
                created_at: now - Duration::seconds(age_secs),
                updated_at: now,
            },
            event_title: "Launch Party".to_string(),
            assignee: None,
            creator,
        }
    }

    #[test]
    fn test_sort_tasks_due_date_nulls_last_then_newest() {
        let mut tasks = vec![
            detail(1, None, 0),
            detail(2, Some((2025, 6, 3)), 10),
            detail(3, Some((2025, 6, 1)), 10),
            detail(4, Some((2025, 6, 3)), 0),
            detail(5, None, 100),
        ];
        sort_tasks(&mut tasks);

        let order: Vec<TaskId> = tasks.iter().map(|t| t.task.id).collect();
        assert_eq!(order, vec![3, 4, 2, 1, 5]);
    }

    #[test]
    fn test_task_view_nulls_for_absent_fields() {
        let view = TaskView::from(detail(7, None, 0));
        let json = serde_json::to_value(&view).unwrap();

        assert!(json["assignedTo"].is_null());
        assert!(json["assignee"].is_null());
        assert!(json["dueDate"].is_null());
        assert_eq!(json["status"], "pending");
        assert_eq!(json["eventTitle"], "Launch Party");
        assert_eq!(json["creator"]["name"], "Alice");
    }

    #[test]
    fn test_task_view_formats_due_date() {
        let view = TaskView::from(detail(7, Some((2025, 12, 24)), 0));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["dueDate"], "2025-12-24");
    }

    #[test]
    fn test_create_task_request_validation() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{"description":"Order cake","assigneeEmail":"bob@example.com","dueDate":"2025-05-30"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());

        let bad_due = CreateTaskRequest {
            due_date: Some("next week".to_string()),
            ..req.clone()
        };
        assert!(bad_due.validate().is_err());

        let blank = CreateTaskRequest {
            description: "  ".to_string(),
            ..req
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_task_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!("cancelled".parse::<TaskStatus>().unwrap(), TaskStatus::Cancelled);
    }
}
