//! Event registry models and the views assembled from them.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use shared::validation::{format_calendar_date, format_time_of_day};
use validator::Validate;

use super::attendee::{AttendanceStatus, AttendeeRole, AttendeeView, RosterEntry};
use super::user::{UserId, UserSummary};

/// Numeric event identifier.
pub type EventId = i64;

/// Represents a planned event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    /// Organizer of record.
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Data required to insert an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub created_by: UserId,
}

/// An event together with its organizer and roster, read from one snapshot.
#[derive(Debug, Clone)]
pub struct EventAggregate {
    pub event: Event,
    pub organizer: UserSummary,
    pub roster: Vec<RosterEntry>,
}

impl EventAggregate {
    /// Returns the roster entry for a user, if any.
    pub fn entry_for(&self, user_id: UserId) -> Option<&RosterEntry> {
        self.roster.iter().find(|e| e.record.user_id == user_id)
    }
}

/// Request payload for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(
        length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(
        length(min = 1, max = 255, message = "Location must be between 1 and 255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub location: String,

    #[validate(custom(function = "shared::validation::validate_calendar_date"))]
    pub event_date: String,

    #[validate(custom(function = "shared::validation::validate_time_of_day"))]
    pub event_time: String,
}

fn serialize_date<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_calendar_date(date))
}

fn serialize_time<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_time_of_day(time))
}

/// Event with its full roster, as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(serialize_with = "serialize_date")]
    pub event_date: NaiveDate,
    #[serde(serialize_with = "serialize_time")]
    pub event_time: NaiveTime,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub attendees: Vec<AttendeeView>,
}

impl EventView {
    fn from_parts(event: Event, roster: Vec<RosterEntry>) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            event_date: event.event_date,
            event_time: event.event_time,
            created_by: event.created_by,
            created_at: event.created_at,
            attendees: roster.into_iter().map(AttendeeView::from).collect(),
        }
    }
}

impl From<EventAggregate> for EventView {
    fn from(aggregate: EventAggregate) -> Self {
        Self::from_parts(aggregate.event, aggregate.roster)
    }
}

/// Single-event view including the organizer and the caller's own standing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailView {
    #[serde(flatten)]
    pub event: EventView,
    pub organizer: UserSummary,
    pub my_role: AttendeeRole,
    pub my_status: AttendanceStatus,
}

impl EventDetailView {
    pub fn new(aggregate: EventAggregate, my_role: AttendeeRole, my_status: AttendanceStatus) -> Self {
        let organizer = aggregate.organizer.clone();
        Self {
            event: aggregate.into(),
            organizer,
            my_role,
            my_status,
        }
    }
}

/// Event listed from the caller's invitations, annotated with the caller's record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitedEventView {
    #[serde(flatten)]
    pub event: EventView,
    pub role: AttendeeRole,
    pub status: AttendanceStatus,
    pub invited_at: DateTime<Utc>,
}

/// Event returned by search, annotated with the caller's role and status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberEventView {
    #[serde(flatten)]
    pub event: EventView,
    pub my_role: AttendeeRole,
    pub my_status: AttendanceStatus,
}

/// Acknowledgement for a deleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedView {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateEventRequest {
        CreateEventRequest {
            title: "Launch Party".to_string(),
            description: Some("Rooftop".to_string()),
            location: "HQ".to_string(),
            event_date: "2025-06-01".to_string(),
            event_time: "18:30".to_string(),
        }
    }

    #[test]
    fn test_create_event_request_validation() {
        assert!(request().validate().is_ok());

        let blank_title = CreateEventRequest {
            title: "   ".to_string(),
            ..request()
        };
        assert!(blank_title.validate().is_err());

        let long_location = CreateEventRequest {
            location: "x".repeat(256),
            ..request()
        };
        assert!(long_location.validate().is_err());

        let bad_date = CreateEventRequest {
            event_date: "06/01/2025".to_string(),
            ..request()
        };
        let errors = bad_date.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("event_date"));

        let bad_time = CreateEventRequest {
            event_time: "6pm".to_string(),
            ..request()
        };
        assert!(bad_time.validate().is_err());
    }

    #[test]
    fn test_create_event_request_accepts_camel_case() {
        let req: CreateEventRequest = serde_json::from_str(
            r#"{"title":"T","location":"L","eventDate":"2025-01-02","eventTime":"09:00:00"}"#,
        )
        .unwrap();
        assert!(req.description.is_none());
        assert_eq!(req.event_date, "2025-01-02");
    }

    #[test]
    fn test_event_view_wire_format() {
        let aggregate = EventAggregate {
            event: Event {
                id: 9,
                title: "Launch Party".to_string(),
                description: String::new(),
                location: "HQ".to_string(),
                event_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                event_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
                created_by: 1,
                created_at: Utc::now(),
            },
            organizer: UserSummary {
                id: 1,
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            },
            roster: Vec::new(),
        };

        let view = EventDetailView::new(aggregate, AttendeeRole::Organizer, AttendanceStatus::Going);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["eventDate"], "2025-06-01");
        assert_eq!(json["eventTime"], "18:30:00");
        assert_eq!(json["createdBy"], 1);
        assert_eq!(json["organizer"]["email"], "alice@example.com");
        assert_eq!(json["myRole"], "organizer");
        assert_eq!(json["myStatus"], "going");
        assert!(json["attendees"].as_array().unwrap().is_empty());
    }
}
