//! PostgreSQL schema migrations for doorman storage.

use sqlx::PgPool;

use crate::error::StorageError;

/// Run all migrations. Idempotent; executed on every startup.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pending_verifications (
            chat_id BIGINT NOT NULL,
            user_id BIGINT NOT NULL,
            challenge_secret INTEGER NOT NULL,
            challenge_message_id BIGINT NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL,
            display_name TEXT NOT NULL,
            prompt_template TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (chat_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| StorageError::Migration(format!("pending_verifications: {e}")))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pending_by_message
           ON pending_verifications (chat_id, challenge_message_id)",
    )
    .execute(pool)
    .await
    .map_err(|e| StorageError::Migration(format!("idx_pending_by_message: {e}")))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS delayed_jobs (
            id BIGSERIAL PRIMARY KEY,
            queue TEXT NOT NULL,
            payload JSONB NOT NULL,
            visible_at TIMESTAMPTZ NOT NULL,
            claimed_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| StorageError::Migration(format!("delayed_jobs: {e}")))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_jobs_due ON delayed_jobs (queue, visible_at)",
    )
    .execute(pool)
    .await
    .map_err(|e| StorageError::Migration(format!("idx_jobs_due: {e}")))?;

    Ok(())
}
