//! Attendance ledger models: the join between users and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::event::EventId;
use super::user::UserId;

/// Role a user holds on an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeRole {
    Organizer,
    #[default]
    Attendee,
}

impl AttendeeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendeeRole::Organizer => "organizer",
            AttendeeRole::Attendee => "attendee",
        }
    }

    /// Returns true if this role can invite users and read the full roster
    pub fn can_manage_event(&self) -> bool {
        matches!(self, AttendeeRole::Organizer)
    }
}

impl FromStr for AttendeeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "organizer" => Ok(AttendeeRole::Organizer),
            "attendee" => Ok(AttendeeRole::Attendee),
            _ => Err(format!("Invalid attendee role: {}", s)),
        }
    }
}

impl fmt::Display for AttendeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's response to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Going,
    Maybe,
    NotGoing,
    Pending,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Going => "going",
            AttendanceStatus::Maybe => "maybe",
            AttendanceStatus::NotGoing => "not_going",
            AttendanceStatus::Pending => "pending",
        }
    }

    /// Returns true if a user may move their own record into this status.
    ///
    /// `pending` is only ever assigned by an invitation.
    pub fn is_response(&self) -> bool {
        !matches!(self, AttendanceStatus::Pending)
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "going" => Ok(AttendanceStatus::Going),
            "maybe" => Ok(AttendanceStatus::Maybe),
            "not_going" => Ok(AttendanceStatus::NotGoing),
            "pending" => Ok(AttendanceStatus::Pending),
            _ => Err(format!("Invalid attendance status: {}", s)),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One user's relationship to one event. Keyed by (event_id, user_id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub event_id: EventId,
    pub user_id: UserId,
    pub role: AttendeeRole,
    pub status: AttendanceStatus,
    pub invited_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn is_organizer(&self) -> bool {
        self.role.can_manage_event()
    }
}

/// An attendance record joined with the attendee's identity.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub record: AttendanceRecord,
    pub user_name: String,
    pub user_email: String,
}

/// Orders a roster organizers first, then by invitation time, then by user id.
pub fn sort_roster(roster: &mut [RosterEntry]) {
    roster.sort_by(|a, b| {
        let rank = |e: &RosterEntry| if e.record.is_organizer() { 0 } else { 1 };
        rank(a)
            .cmp(&rank(b))
            .then(a.record.invited_at.cmp(&b.record.invited_at))
            .then(a.record.user_id.cmp(&b.record.user_id))
    });
}

/// Roster entry as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeView {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub role: AttendeeRole,
    pub status: AttendanceStatus,
    pub invited_at: DateTime<Utc>,
}

impl From<RosterEntry> for AttendeeView {
    fn from(entry: RosterEntry) -> Self {
        Self {
            user_id: entry.record.user_id,
            user_name: entry.user_name,
            user_email: entry.user_email,
            role: entry.record.role,
            status: entry.record.status,
            invited_at: entry.record.invited_at,
        }
    }
}

/// Request payload for inviting a user to an event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InviteUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Defaults to attendee.
    pub role: Option<AttendeeRole>,
}

/// Request payload for responding to an invitation.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAttendanceRequest {
    pub status: AttendanceStatus,
}

/// Result of a successful invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationView {
    pub message: String,
    pub event_id: EventId,
    pub user_id: UserId,
    pub email: String,
    pub role: AttendeeRole,
    pub status: AttendanceStatus,
}

/// Result of an attendance status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUpdateView {
    pub message: String,
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: AttendanceStatus,
    pub role: AttendeeRole,
}

/// Full roster of one event, for organizers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendeesView {
    pub event_id: EventId,
    pub event_title: String,
    pub attendees: Vec<AttendeeView>,
}
