//! User repository for database operations.

use sqlx::PgExecutor;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

/// Queries over the users table.
///
/// Every function takes an executor, so the same query runs against the pool
/// or inside an open transaction.
pub struct UserRepository;

impl UserRepository {
    /// Insert a user. The email must already be normalized.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Find a user by normalized email.
    pub async fn find_by_email<'e, E: PgExecutor<'e>>(
        executor: E,
        email: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(executor)
        .await;
        timer.finish(&result);
        result
    }

    /// Find a user by id.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await;
        timer.finish(&result);
        result
    }
}
