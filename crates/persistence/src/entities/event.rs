//! Event entities (database row mapping).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::{AttendanceRecord, Event, UserSummary};
use sqlx::FromRow;

use super::attendee::{AttendanceStatusDb, AttendeeRoleDb};

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl From<EventEntity> for Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            location: entity.location,
            event_date: entity.event_date,
            event_time: entity.event_time,
            created_by: entity.created_by,
            created_at: entity.created_at,
        }
    }
}

/// Event row joined with its creator's identity.
#[derive(Debug, Clone, FromRow)]
pub struct EventWithOrganizerEntity {
    #[sqlx(flatten)]
    pub event: EventEntity,
    pub organizer_name: String,
    pub organizer_email: String,
}

impl EventWithOrganizerEntity {
    pub fn into_parts(self) -> (Event, UserSummary) {
        let organizer = UserSummary {
            id: self.event.created_by,
            name: self.organizer_name,
            email: self.organizer_email,
        };
        (self.event.into(), organizer)
    }
}

/// Event row seen through one member's attendance record.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipEntity {
    #[sqlx(flatten)]
    pub event: EventWithOrganizerEntity,
    pub member_id: i64,
    pub member_role: AttendeeRoleDb,
    pub member_status: AttendanceStatusDb,
    pub member_invited_at: DateTime<Utc>,
}

impl MembershipEntity {
    pub fn record(&self) -> AttendanceRecord {
        AttendanceRecord {
            event_id: self.event.event.id,
            user_id: self.member_id,
            role: self.member_role.into(),
            status: self.member_status.into(),
            invited_at: self.member_invited_at,
        }
    }
}
