//! Attendance ledger repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::entities::{AttendanceStatusDb, AttendeeEntity, AttendeeRoleDb, RosterEntity};
use crate::metrics::QueryTimer;

/// Queries over the event_attendees table.
pub struct AttendeeRepository;

impl AttendeeRepository {
    /// Insert a record. The (event_id, user_id) primary key rejects duplicates.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        event_id: i64,
        user_id: i64,
        role: AttendeeRoleDb,
        status: AttendanceStatusDb,
        invited_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("create_attendee");
        let result = sqlx::query(
            r#"
            INSERT INTO event_attendees (event_id, user_id, role, status, invited_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(role)
        .bind(status)
        .bind(invited_at)
        .execute(executor)
        .await;
        timer.finish(&result);
        result.map(|_| ())
    }

    /// Find the record for one (event, user) pair.
    pub async fn find<'e, E: PgExecutor<'e>>(
        executor: E,
        event_id: i64,
        user_id: i64,
    ) -> Result<Option<AttendeeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_attendee");
        let result = sqlx::query_as::<_, AttendeeEntity>(
            r#"
            SELECT event_id, user_id, role, status, invited_at
            FROM event_attendees
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Update the status of a record in place.
    pub async fn update_status<'e, E: PgExecutor<'e>>(
        executor: E,
        event_id: i64,
        user_id: i64,
        status: AttendanceStatusDb,
    ) -> Result<Option<AttendeeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_attendee_status");
        let result = sqlx::query_as::<_, AttendeeEntity>(
            r#"
            UPDATE event_attendees
            SET status = $3
            WHERE event_id = $1 AND user_id = $2
            RETURNING event_id, user_id, role, status, invited_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Rosters for a set of events, organizers first, then by invitation time.
    pub async fn list_rosters<'e, E: PgExecutor<'e>>(
        executor: E,
        event_ids: &[i64],
    ) -> Result<Vec<RosterEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_rosters");
        let result = sqlx::query_as::<_, RosterEntity>(
            r#"
            SELECT ea.event_id, ea.user_id, ea.role, ea.status, ea.invited_at,
                   u.name AS user_name, u.email AS user_email
            FROM event_attendees ea
            JOIN users u ON u.id = ea.user_id
            WHERE ea.event_id = ANY($1)
            ORDER BY ea.event_id, (ea.role = 'organizer') DESC, ea.invited_at ASC, ea.user_id ASC
            "#,
        )
        .bind(event_ids)
        .fetch_all(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Delete every record of an event. Returns the number of rows removed.
    pub async fn delete_for_event<'e, E: PgExecutor<'e>>(
        executor: E,
        event_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_event_attendees");
        let result = sqlx::query("DELETE FROM event_attendees WHERE event_id = $1")
            .bind(event_id)
            .execute(executor)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected())
    }
}
