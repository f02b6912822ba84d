//! Event repository for database operations.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgExecutor;

use crate::entities::{AttendeeRoleDb, EventEntity, EventWithOrganizerEntity, MembershipEntity};
use crate::metrics::QueryTimer;

/// Queries over the events table.
pub struct EventRepository;

/// Column values for a new event row.
pub struct EventInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub location: &'a str,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub created_by: i64,
}

impl EventRepository {
    /// Insert an event.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        input: EventInput<'_>,
    ) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_event");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            INSERT INTO events (title, description, location, event_date, event_time, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, location, event_date, event_time, created_by, created_at
            "#,
        )
        .bind(input.title)
        .bind(input.description)
        .bind(input.location)
        .bind(input.event_date)
        .bind(input.event_time)
        .bind(input.created_by)
        .fetch_one(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Find an event by id.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
    ) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT id, title, description, location, event_date, event_time, created_by, created_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Find an event together with its creator's identity.
    pub async fn find_with_organizer<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
    ) -> Result<Option<EventWithOrganizerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_with_organizer");
        let result = sqlx::query_as::<_, EventWithOrganizerEntity>(
            r#"
            SELECT e.id, e.title, e.description, e.location, e.event_date, e.event_time,
                   e.created_by, e.created_at,
                   u.name AS organizer_name, u.email AS organizer_email
            FROM events e
            JOIN users u ON u.id = e.created_by
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// List events created by a user, newest first.
    pub async fn list_by_creator<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i64,
    ) -> Result<Vec<EventWithOrganizerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_events_by_creator");
        let result = sqlx::query_as::<_, EventWithOrganizerEntity>(
            r#"
            SELECT e.id, e.title, e.description, e.location, e.event_date, e.event_time,
                   e.created_by, e.created_at,
                   u.name AS organizer_name, u.email AS organizer_email
            FROM events e
            JOIN users u ON u.id = e.created_by
            WHERE e.created_by = $1
            ORDER BY e.created_at DESC, e.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// List events a user holds a record for, most recent invitation first.
    pub async fn list_memberships<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i64,
    ) -> Result<Vec<MembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_memberships");
        let result = sqlx::query_as::<_, MembershipEntity>(
            r#"
            SELECT e.id, e.title, e.description, e.location, e.event_date, e.event_time,
                   e.created_by, e.created_at,
                   u.name AS organizer_name, u.email AS organizer_email,
                   ea.user_id AS member_id, ea.role AS member_role,
                   ea.status AS member_status, ea.invited_at AS member_invited_at
            FROM event_attendees ea
            JOIN events e ON e.id = ea.event_id
            JOIN users u ON u.id = e.created_by
            WHERE ea.user_id = $1
            ORDER BY ea.invited_at DESC, e.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Search the events a user holds a record for.
    ///
    /// `keyword` is matched as a literal, case-insensitive substring of the
    /// title or description. `role` restricts to the user's own role.
    pub async fn search<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i64,
        keyword: Option<&str>,
        role: Option<AttendeeRoleDb>,
    ) -> Result<Vec<MembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("search_events");
        let result = sqlx::query_as::<_, MembershipEntity>(
            r#"
            SELECT e.id, e.title, e.description, e.location, e.event_date, e.event_time,
                   e.created_by, e.created_at,
                   u.name AS organizer_name, u.email AS organizer_email,
                   ea.user_id AS member_id, ea.role AS member_role,
                   ea.status AS member_status, ea.invited_at AS member_invited_at
            FROM event_attendees ea
            JOIN events e ON e.id = ea.event_id
            JOIN users u ON u.id = e.created_by
            WHERE ea.user_id = $1
              AND ($2::attendee_role IS NULL OR ea.role = $2)
              AND ($3::text IS NULL
                   OR strpos(lower(e.title), lower($3)) > 0
                   OR strpos(lower(e.description), lower($3)) > 0)
            ORDER BY e.created_at DESC, e.id DESC
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

    /// Delete an event. Returns the number of rows removed.
    pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_event");
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected())
    }
}
