//! Access rules for events, rosters and tasks.
//!
//! Every rule is a pure function of the event, the actor and the actor's
//! attendance record (if any), so callers decide where those come from.

use crate::models::{AttendanceRecord, AttendanceStatus, AttendeeRole, Event, Task, UserId};

/// Creator or anyone holding a record may view an event.
pub fn can_view(event: &Event, actor: UserId, record: Option<&AttendanceRecord>) -> bool {
    event.created_by == actor || record.is_some()
}

/// Creator or any organizer-role record may invite, read the roster and manage tasks.
pub fn can_manage(event: &Event, actor: UserId, record: Option<&AttendanceRecord>) -> bool {
    event.created_by == actor || record.is_some_and(AttendanceRecord::is_organizer)
}

/// Only the creator may delete an event.
pub fn can_delete(event: &Event, actor: UserId) -> bool {
    event.created_by == actor
}

/// Organizers and the task's assignee may move a task between statuses.
pub fn can_update_task(
    event: &Event,
    task: &Task,
    actor: UserId,
    record: Option<&AttendanceRecord>,
) -> bool {
    can_manage(event, actor, record) || task.assigned_to == Some(actor)
}

/// The actor's role and status on an event.
///
/// A creator with no explicit record is reported as organizer/going.
pub fn standing(
    event: &Event,
    actor: UserId,
    record: Option<&AttendanceRecord>,
) -> Option<(AttendeeRole, AttendanceStatus)> {
    match record {
        Some(record) => Some((record.role, record.status)),
        None if event.created_by == actor => Some((AttendeeRole::Organizer, AttendanceStatus::Going)),
        None => None,
    }
}
