//! Repository for the `users` table.
//!
//! Users are managed by the identity provider; this service only needs to
//! know whether an id refers to a real user.

use appraise_core::types::DbId;
use sqlx::PgPool;

pub struct UserRepo;

impl UserRepo {
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Insert a user with the named role, returning its id.
    pub async fn create(pool: &PgPool, username: &str, role_name: &str) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO users (username, role_id)
             SELECT $1, id FROM roles WHERE name = $2
             RETURNING id",
        )
        .bind(username)
        .bind(role_name)
        .fetch_one(pool)
        .await
    }
}
