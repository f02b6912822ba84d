//! Access control and workflow engine.
//!
//! [`PlannerService`] enforces who may create, invite, respond, view,
//! delete and search, and coordinates the multi-record writes each
//! operation needs. Existence is always checked before authorization, so a
//! missing event is reported as not found even to callers who could never
//! have seen it.

use std::sync::Arc;

use chrono::Utc;
use shared::validation::{normalize_email, parse_calendar_date, parse_time_of_day};
use tracing::{info, warn};

use crate::error::{PlannerError, PlannerResult};
use crate::models::attendee::{
    AttendanceUpdateView, AttendeeView, EventAttendeesView, InvitationView, InviteUserRequest,
};
use crate::models::event::{
    CreateEventRequest, DeletedView, EventDetailView, EventView, InvitedEventView,
    MemberEventView,
};
use crate::models::search::{SearchQuery, SearchResults};
use crate::models::task::{CreateTaskRequest, TaskView};
use crate::models::{
    AttendanceRecord, AttendanceStatus, AttendeeRole, Event, EventAggregate, EventId, NewEvent,
    NewTask, RosterEntry, Task, TaskDetail, TaskId, TaskStatus, UserId,
};
use crate::services::access;
use crate::store::{Membership, PlannerStore, StoreTx};

const MAX_TITLE_CHARS: usize = 255;
const MAX_LOCATION_CHARS: usize = 255;
const MAX_TASK_DESCRIPTION_CHARS: usize = 2000;

fn event_not_found() -> PlannerError {
    PlannerError::NotFound("event not found".to_string())
}

/// Trims a required text field and checks its length in characters.
fn required_text(value: &str, field: &str, max: usize) -> PlannerResult<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > max {
        return Err(PlannerError::Validation(format!(
            "{} must be between 1 and {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

/// Commits on success and rolls back on failure.
///
/// A failed rollback is logged; the original error is still returned.
async fn finish<T>(tx: Box<dyn StoreTx>, result: PlannerResult<T>) -> PlannerResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Failed to roll back transaction");
            }
            Err(err)
        }
    }
}

fn member_view(membership: Membership) -> MemberEventView {
    let Membership { record, aggregate } = membership;
    MemberEventView {
        event: aggregate.into(),
        my_role: record.role,
        my_status: record.status,
    }
}

/// The planner's workflow engine. Cheap to clone.
#[derive(Clone)]
pub struct PlannerService {
    store: Arc<dyn PlannerStore>,
}

impl PlannerService {
    pub fn new(store: Arc<dyn PlannerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PlannerStore> {
        &self.store
    }

    /// Creates an event and its creator's organizer record in one transaction.
    pub async fn create_event(
        &self,
        actor: UserId,
        request: CreateEventRequest,
    ) -> PlannerResult<EventDetailView> {
        let title = required_text(&request.title, "title", MAX_TITLE_CHARS)?;
        let location = required_text(&request.location, "location", MAX_LOCATION_CHARS)?;
        let event_date = parse_calendar_date(&request.event_date).ok_or_else(|| {
            PlannerError::Validation("eventDate must be in YYYY-MM-DD format".to_string())
        })?;
        let event_time = parse_time_of_day(&request.event_time).ok_or_else(|| {
            PlannerError::Validation("eventTime must be in HH:MM or HH:MM:SS format".to_string())
        })?;
        let description = request
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let new_event = NewEvent {
            title,
            description,
            location,
            event_date,
            event_time,
            created_by: actor,
        };

        let mut tx = self.store.begin().await?;
        let result = Self::create_event_in_tx(tx.as_mut(), new_event).await;
        let aggregate = finish(tx, result).await?;

        info!(
            event_id = aggregate.event.id,
            user_id = actor,
            title = %aggregate.event.title,
            "Event created"
        );

        // Assembled from the committed writes; no read after commit.
        Ok(EventDetailView::new(
            aggregate,
            AttendeeRole::Organizer,
            AttendanceStatus::Going,
        ))
    }

    async fn create_event_in_tx(
        tx: &mut dyn StoreTx,
        new_event: NewEvent,
    ) -> PlannerResult<EventAggregate> {
        let creator = tx
            .find_user_by_id(new_event.created_by)
            .await?
            .ok_or_else(|| PlannerError::NotFound("user not found".to_string()))?;

        let event = tx.insert_event(new_event).await?;
        let record = AttendanceRecord {
            event_id: event.id,
            user_id: creator.id,
            role: AttendeeRole::Organizer,
            status: AttendanceStatus::Going,
            invited_at: event.created_at,
        };
        tx.insert_attendance(record.clone()).await?;

        Ok(EventAggregate {
            event,
            organizer: creator.summary(),
            roster: vec![RosterEntry {
                record,
                user_name: creator.name,
                user_email: creator.email,
            }],
        })
    }

    /// Invites a registered user to an event. Organizers only.
    pub async fn invite_user(
        &self,
        actor: UserId,
        event_id: EventId,
        request: InviteUserRequest,
    ) -> PlannerResult<InvitationView> {
        let email = normalize_email(&request.email);
        if email.is_empty() {
            return Err(PlannerError::Validation("email is required".to_string()));
        }
        let role = request.role.unwrap_or_default();

        let mut tx = self.store.begin().await?;
        let result = Self::invite_in_tx(tx.as_mut(), actor, event_id, &email, role).await;
        let record = finish(tx, result).await?;

        info!(
            event_id,
            user_id = actor,
            invitee_id = record.user_id,
            role = %record.role,
            "User invited to event"
        );

        Ok(InvitationView {
            message: "user invited successfully".to_string(),
            event_id,
            user_id: record.user_id,
            email,
            role: record.role,
            status: record.status,
        })
    }

    async fn invite_in_tx(
        tx: &mut dyn StoreTx,
        actor: UserId,
        event_id: EventId,
        email: &str,
        role: AttendeeRole,
    ) -> PlannerResult<AttendanceRecord> {
        let event = tx.find_event(event_id).await?.ok_or_else(event_not_found)?;
        let actor_record = tx.find_attendance(event_id, actor).await?;
        if !access::can_manage(&event, actor, actor_record.as_ref()) {
            return Err(PlannerError::Forbidden(
                "only organizers can invite users to this event".to_string(),
            ));
        }

        let invitee = tx
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| PlannerError::NotFound("user not found".to_string()))?;

        // The creator is always a member, with or without a stored record.
        if invitee.id == event.created_by
            || tx.find_attendance(event_id, invitee.id).await?.is_some()
        {
            return Err(PlannerError::Conflict(
                "user is already invited to this event".to_string(),
            ));
        }

        let record = AttendanceRecord {
            event_id,
            user_id: invitee.id,
            role,
            status: AttendanceStatus::Pending,
            invited_at: Utc::now(),
        };
        // A concurrent invite that slipped past the check above fails here on
        // the (event_id, user_id) key and surfaces as a conflict.
        tx.insert_attendance(record.clone()).await?;
        Ok(record)
    }

    /// Records the actor's response to an invitation.
    pub async fn set_attendance_status(
        &self,
        actor: UserId,
        event_id: EventId,
        status: AttendanceStatus,
    ) -> PlannerResult<AttendanceUpdateView> {
        if !status.is_response() {
            return Err(PlannerError::Validation(
                "status must be one of going, maybe, not_going".to_string(),
            ));
        }

        let mut tx = self.store.begin().await?;
        let result = Self::set_status_in_tx(tx.as_mut(), actor, event_id, status).await;
        let record = finish(tx, result).await?;

        info!(
            event_id,
            user_id = actor,
            status = %record.status,
            "Attendance status updated"
        );

        Ok(AttendanceUpdateView {
            message: "attendance status updated successfully".to_string(),
            event_id,
            user_id: actor,
            status: record.status,
            role: record.role,
        })
    }

    async fn set_status_in_tx(
        tx: &mut dyn StoreTx,
        actor: UserId,
        event_id: EventId,
        status: AttendanceStatus,
    ) -> PlannerResult<AttendanceRecord> {
        let event = tx.find_event(event_id).await?.ok_or_else(event_not_found)?;

        if tx.find_attendance(event_id, actor).await?.is_some() {
            return tx
                .update_attendance_status(event_id, actor, status)
                .await?
                .ok_or_else(|| PlannerError::NotFound("attendance record not found".to_string()));
        }

        if event.created_by != actor {
            return Err(PlannerError::Forbidden(
                "you are not invited to this event".to_string(),
            ));
        }

        // Creator whose organizer record has gone missing.
        let record = AttendanceRecord {
            event_id,
            user_id: actor,
            role: AttendeeRole::Organizer,
            status,
            invited_at: Utc::now(),
        };
        tx.insert_attendance(record.clone()).await?;
        Ok(record)
    }

    /// Returns one event with its organizer, roster and the actor's own standing.
    pub async fn get_event_details(
        &self,
        actor: UserId,
        event_id: EventId,
    ) -> PlannerResult<EventDetailView> {
        let aggregate = self
            .store
            .load_event(event_id)
            .await?
            .ok_or_else(event_not_found)?;

        let record = aggregate.entry_for(actor).map(|e| &e.record);
        let (role, status) = access::standing(&aggregate.event, actor, record).ok_or_else(|| {
            PlannerError::Forbidden("you are not authorized to view this event".to_string())
        })?;

        Ok(EventDetailView::new(aggregate, role, status))
    }

    /// Events the actor created, newest first.
    pub async fn list_organized_events(&self, actor: UserId) -> PlannerResult<Vec<EventView>> {
        let events = self.store.list_organized_events(actor).await?;
        Ok(events.into_iter().map(EventView::from).collect())
    }

    /// Events the actor holds a record for, most recent invitation first.
    pub async fn list_invited_events(&self, actor: UserId) -> PlannerResult<Vec<InvitedEventView>> {
        let memberships = self.store.list_memberships(actor).await?;
        Ok(memberships
            .into_iter()
            .map(|Membership { record, aggregate }| InvitedEventView {
                event: aggregate.into(),
                role: record.role,
                status: record.status,
                invited_at: record.invited_at,
            })
            .collect())
    }

    /// Full roster of an event. Organizers only.
    pub async fn list_attendees(
        &self,
        actor: UserId,
        event_id: EventId,
    ) -> PlannerResult<EventAttendeesView> {
        let aggregate = self
            .store
            .load_event(event_id)
            .await?
            .ok_or_else(event_not_found)?;

        let record = aggregate.entry_for(actor).map(|e| &e.record);
        if !access::can_manage(&aggregate.event, actor, record) {
            return Err(PlannerError::Forbidden(
                "only organizers can view the attendee list".to_string(),
            ));
        }

        Ok(EventAttendeesView {
            event_id: aggregate.event.id,
            event_title: aggregate.event.title,
            attendees: aggregate.roster.into_iter().map(AttendeeView::from).collect(),
        })
    }

    /// Deletes an event with its records and tasks. Creator only.
    pub async fn delete_event(&self, actor: UserId, event_id: EventId) -> PlannerResult<DeletedView> {
        let mut tx = self.store.begin().await?;
        let result = Self::delete_in_tx(tx.as_mut(), actor, event_id).await;
        let (attendees_removed, tasks_removed) = finish(tx, result).await?;

        info!(
            event_id,
            user_id = actor,
            attendees_removed,
            tasks_removed,
            "Event deleted"
        );

        Ok(DeletedView {
            message: "event deleted successfully".to_string(),
        })
    }

    async fn delete_in_tx(
        tx: &mut dyn StoreTx,
        actor: UserId,
        event_id: EventId,
    ) -> PlannerResult<(u64, u64)> {
        let event = tx.find_event(event_id).await?.ok_or_else(event_not_found)?;
        if !access::can_delete(&event, actor) {
            return Err(PlannerError::Forbidden(
                "only the event creator can delete this event".to_string(),
            ));
        }

        let attendees_removed = tx.delete_attendance_for_event(event_id).await?;
        let tasks_removed = tx.delete_tasks_for_event(event_id).await?;
        if !tx.delete_event(event_id).await? {
            return Err(event_not_found());
        }
        Ok((attendees_removed, tasks_removed))
    }

    /// Keyword search over the actor's own events and their tasks.
    pub async fn search(&self, actor: UserId, query: &SearchQuery) -> PlannerResult<SearchResults> {
        let (filter, search_type) = query.normalize().map_err(PlannerError::Validation)?;
        let mut results = SearchResults::default();

        if search_type.includes_events() {
            let events = self.store.search_events(actor, &filter).await?;
            results.events = Some(events.into_iter().map(member_view).collect());
        }

        if search_type.includes_tasks() {
            let tasks = self.store.search_tasks(actor, &filter).await?;
            results.tasks = Some(tasks.into_iter().map(TaskView::from).collect());
        }

        Ok(results)
    }

    /// Adds a task to an event. Organizers only.
    pub async fn create_task(
        &self,
        actor: UserId,
        event_id: EventId,
        request: CreateTaskRequest,
    ) -> PlannerResult<TaskView> {
        let description =
            required_text(&request.description, "description", MAX_TASK_DESCRIPTION_CHARS)?;
        let due_date = match request.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_calendar_date(raw).ok_or_else(|| {
                PlannerError::Validation("dueDate must be in YYYY-MM-DD format".to_string())
            })?),
        };
        let assignee_email = request
            .assignee_email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty());

        let mut tx = self.store.begin().await?;
        let result = Self::create_task_in_tx(
            tx.as_mut(),
            actor,
            event_id,
            description,
            assignee_email.as_deref(),
            due_date,
        )
        .await;
        let detail = finish(tx, result).await?;

        info!(
            event_id,
            task_id = detail.task.id,
            user_id = actor,
            assignee_id = ?detail.task.assigned_to,
            "Task created"
        );

        Ok(detail.into())
    }

    async fn create_task_in_tx(
        tx: &mut dyn StoreTx,
        actor: UserId,
        event_id: EventId,
        description: String,
        assignee_email: Option<&str>,
        due_date: Option<chrono::NaiveDate>,
    ) -> PlannerResult<TaskDetail> {
        let event = tx.find_event(event_id).await?.ok_or_else(event_not_found)?;
        let actor_record = tx.find_attendance(event_id, actor).await?;
        if !access::can_manage(&event, actor, actor_record.as_ref()) {
            return Err(PlannerError::Forbidden(
                "only organizers can create tasks for this event".to_string(),
            ));
        }

        let assigned_to = match assignee_email {
            Some(email) => {
                let assignee = tx
                    .find_user_by_email(email)
                    .await?
                    .ok_or_else(|| PlannerError::NotFound("assignee not found".to_string()))?;
                let is_member = assignee.id == event.created_by
                    || tx.find_attendance(event_id, assignee.id).await?.is_some();
                if !is_member {
                    return Err(PlannerError::Validation(
                        "assignee must be invited to the event".to_string(),
                    ));
                }
                Some(assignee.id)
            }
            None => None,
        };

        let task = tx
            .insert_task(NewTask {
                event_id,
                description,
                assigned_to,
                due_date,
                created_by: actor,
            })
            .await?;

        Self::task_detail_in_tx(tx, &event, task).await
    }

    /// Tasks of one event. Anyone who can view the event may list them.
    pub async fn list_event_tasks(
        &self,
        actor: UserId,
        event_id: EventId,
    ) -> PlannerResult<Vec<TaskView>> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or_else(event_not_found)?;
        let record = self.store.find_attendance(event_id, actor).await?;
        if !access::can_view(&event, actor, record.as_ref()) {
            return Err(PlannerError::Forbidden(
                "you are not authorized to view this event".to_string(),
            ));
        }

        let tasks = self.store.list_event_tasks(event_id).await?;
        Ok(tasks.into_iter().map(TaskView::from).collect())
    }

    /// Moves a task to a new status. Organizers and the assignee only.
    pub async fn update_task_status(
        &self,
        actor: UserId,
        event_id: EventId,
        task_id: TaskId,
        status: TaskStatus,
    ) -> PlannerResult<TaskView> {
        let mut tx = self.store.begin().await?;
        let result = Self::update_task_in_tx(tx.as_mut(), actor, event_id, task_id, status).await;
        let detail = finish(tx, result).await?;

        info!(
            event_id,
            task_id,
            user_id = actor,
            status = %detail.task.status,
            "Task status updated"
        );

        Ok(detail.into())
    }

    async fn update_task_in_tx(
        tx: &mut dyn StoreTx,
        actor: UserId,
        event_id: EventId,
        task_id: TaskId,
        status: TaskStatus,
    ) -> PlannerResult<TaskDetail> {
        let task_not_found = || PlannerError::NotFound("task not found".to_string());

        let event = tx.find_event(event_id).await?.ok_or_else(event_not_found)?;
        let task = tx
            .find_task(task_id)
            .await?
            .filter(|t| t.event_id == event_id)
            .ok_or_else(task_not_found)?;

        let record = tx.find_attendance(event_id, actor).await?;
        if !access::can_update_task(&event, &task, actor, record.as_ref()) {
            return Err(PlannerError::Forbidden(
                "only organizers or the assignee can update this task".to_string(),
            ));
        }

        let task = tx
            .update_task_status(task_id, status, Utc::now())
            .await?
            .ok_or_else(task_not_found)?;

        Self::task_detail_in_tx(tx, &event, task).await
    }

    async fn task_detail_in_tx(
        tx: &mut dyn StoreTx,
        event: &Event,
        task: Task,
    ) -> PlannerResult<TaskDetail> {
        let creator = tx
            .find_user_by_id(task.created_by)
            .await?
            .ok_or_else(|| PlannerError::NotFound("user not found".to_string()))?;

        let assignee = match task.assigned_to {
            Some(id) => tx.find_user_by_id(id).await?.map(|u| u.summary()),
            None => None,
        };

        Ok(TaskDetail {
            task,
            event_title: event.title.clone(),
            assignee,
            creator: creator.summary(),
        })
    }
}
