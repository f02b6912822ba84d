//! Attendance record entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{AttendanceRecord, AttendanceStatus, AttendeeRole, RosterEntry};
use sqlx::FromRow;

/// Database enum for attendee_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "attendee_role", rename_all = "lowercase")]
pub enum AttendeeRoleDb {
    Organizer,
    Attendee,
}

impl From<AttendeeRoleDb> for AttendeeRole {
    fn from(db_role: AttendeeRoleDb) -> Self {
        match db_role {
            AttendeeRoleDb::Organizer => AttendeeRole::Organizer,
            AttendeeRoleDb::Attendee => AttendeeRole::Attendee,
        }
    }
}

impl From<AttendeeRole> for AttendeeRoleDb {
    fn from(role: AttendeeRole) -> Self {
        match role {
            AttendeeRole::Organizer => AttendeeRoleDb::Organizer,
            AttendeeRole::Attendee => AttendeeRoleDb::Attendee,
        }
    }
}

/// Database enum for attendance_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
pub enum AttendanceStatusDb {
    Going,
    Maybe,
    NotGoing,
    Pending,
}

impl From<AttendanceStatusDb> for AttendanceStatus {
    fn from(db_status: AttendanceStatusDb) -> Self {
        match db_status {
            AttendanceStatusDb::Going => AttendanceStatus::Going,
            AttendanceStatusDb::Maybe => AttendanceStatus::Maybe,
            AttendanceStatusDb::NotGoing => AttendanceStatus::NotGoing,
            AttendanceStatusDb::Pending => AttendanceStatus::Pending,
        }
    }
}

impl From<AttendanceStatus> for AttendanceStatusDb {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Going => AttendanceStatusDb::Going,
            AttendanceStatus::Maybe => AttendanceStatusDb::Maybe,
            AttendanceStatus::NotGoing => AttendanceStatusDb::NotGoing,
            AttendanceStatus::Pending => AttendanceStatusDb::Pending,
        }
    }
}

/// Database row mapping for the event_attendees table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendeeEntity {
    pub event_id: i64,
    pub user_id: i64,
    pub role: AttendeeRoleDb,
    pub status: AttendanceStatusDb,
    pub invited_at: DateTime<Utc>,
}

impl From<AttendeeEntity> for AttendanceRecord {
    fn from(entity: AttendeeEntity) -> Self {
        Self {
            event_id: entity.event_id,
            user_id: entity.user_id,
            role: entity.role.into(),
            status: entity.status.into(),
            invited_at: entity.invited_at,
        }
    }
}

/// Attendance row joined with the attendee's name and email.
#[derive(Debug, Clone, FromRow)]
pub struct RosterEntity {
    pub event_id: i64,
    pub user_id: i64,
    pub role: AttendeeRoleDb,
    pub status: AttendanceStatusDb,
    pub invited_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
}

impl From<RosterEntity> for RosterEntry {
    fn from(entity: RosterEntity) -> Self {
        Self {
            record: AttendanceRecord {
                event_id: entity.event_id,
                user_id: entity.user_id,
                role: entity.role.into(),
                status: entity.status.into(),
                invited_at: entity.invited_at,
            },
            user_name: entity.user_name,
            user_email: entity.user_email,
        }
    }
}
