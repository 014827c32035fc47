/*
 * Responsibility
 * - SQLx operations for the user_sessions table
 * - implements the SessionBackend seam of the durable session store
 *
 * Expected table:
 *   user_sessions (
 *       session_id  TEXT PRIMARY KEY,
 *       user_id     UUID NOT NULL,
 *       created_at  TIMESTAMPTZ NOT NULL,
 *       updated_at  TIMESTAMPTZ
 *   )
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoResult;
use crate::services::session::{SessionBackend, SessionRecord};

#[derive(Clone, Debug)]
pub struct PgSessionRepo {
    pool: PgPool,
}

impl PgSessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    session_id: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        SessionRecord {
            session_id: row.session_id,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl SessionBackend for PgSessionRepo {
    async fn insert(&self, record: &SessionRecord) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (session_id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&record.session_id)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch(&self, session_id: &str) -> RepoResult<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT session_id, user_id, created_at, updated_at
            FROM user_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRecord::from))
    }

    async fn touch(&self, session_id: &str, now: DateTime<Utc>) -> RepoResult<u64> {
        let res = sqlx::query(
            r#"
            UPDATE user_sessions
            SET updated_at = $2
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }

    async fn delete(&self, session_id: &str) -> RepoResult<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM user_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }
}
