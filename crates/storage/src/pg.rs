//! PostgreSQL storage backend using sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use doorman_core::{PendingVerification, QueueName};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::error::StorageError;
use crate::migrations::run_migrations;
use crate::traits::{DelayQueueStore, QueuedJob, VerificationStore};

const POOL_MAX_CONNECTIONS: u32 = 8;

/// Both stores on one connection pool.
#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(POOL_MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        run_migrations(&pool).await?;
        tracing::info!("PgStorage initialized");
        Ok(Self { pool })
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<PendingVerification, StorageError> {
    Ok(PendingVerification {
        chat_id: row.try_get("chat_id").map_err(StorageError::from)?,
        user_id: row.try_get("user_id").map_err(StorageError::from)?,
        challenge_secret: row.try_get("challenge_secret").map_err(StorageError::from)?,
        challenge_message_id: row.try_get("challenge_message_id").map_err(StorageError::from)?,
        expires_at: row.try_get("expires_at").map_err(StorageError::from)?,
        display_name: row.try_get("display_name").map_err(StorageError::from)?,
        prompt_template: row.try_get("prompt_template").map_err(StorageError::from)?,
    })
}

#[async_trait]
impl VerificationStore for PgStorage {
    async fn get(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<Option<PendingVerification>, StorageError> {
        let row = sqlx::query(
            "SELECT chat_id, user_id, challenge_secret, challenge_message_id,
                    expires_at, display_name, prompt_template
               FROM pending_verifications
              WHERE chat_id = $1 AND user_id = $2",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn create(&self, record: &PendingVerification) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO pending_verifications
                 (chat_id, user_id, challenge_secret, challenge_message_id,
                  expires_at, display_name, prompt_template)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (chat_id, user_id) DO UPDATE
                SET challenge_secret = EXCLUDED.challenge_secret,
                    challenge_message_id = EXCLUDED.challenge_message_id,
                    expires_at = EXCLUDED.expires_at,
                    display_name = EXCLUDED.display_name,
                    prompt_template = EXCLUDED.prompt_template,
                    created_at = NOW()",
        )
        .bind(record.chat_id)
        .bind(record.user_id)
        .bind(record.challenge_secret)
        .bind(record.challenge_message_id)
        .bind(record.expires_at)
        .bind(&record.display_name)
        .bind(&record.prompt_template)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_challenge(
        &self,
        chat_id: i64,
        user_id: i64,
        new_secret: i32,
    ) -> Result<(), StorageError> {
        // A zero-row update means the record was resolved concurrently;
        // the superseded secret is moot either way.
        sqlx::query(
            "UPDATE pending_verifications
                SET challenge_secret = $3
              WHERE chat_id = $1 AND user_id = $2",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(new_secret)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, chat_id: i64, user_id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM pending_verifications WHERE chat_id = $1 AND user_id = $2")
            .bind(chat_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_message(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> Result<Option<PendingVerification>, StorageError> {
        let row = sqlx::query(
            "SELECT chat_id, user_id, challenge_secret, challenge_message_id,
                    expires_at, display_name, prompt_template
               FROM pending_verifications
              WHERE chat_id = $1 AND challenge_message_id = $2
              LIMIT 1",
        )
        .bind(chat_id)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_record).transpose()
    }
}

fn row_to_job(row: &sqlx::postgres::PgRow) -> Result<QueuedJob, StorageError> {
    let queue_str: String = row.try_get("queue").map_err(StorageError::from)?;
    let queue = queue_str.parse::<QueueName>().map_err(|e| StorageError::DataCorruption {
        context: format!("queue column '{queue_str}'"),
        source: e.into(),
    })?;
    Ok(QueuedJob {
        id: row.try_get("id").map_err(StorageError::from)?,
        queue,
        payload: row.try_get("payload").map_err(StorageError::from)?,
        visible_at: row.try_get("visible_at").map_err(StorageError::from)?,
    })
}

#[async_trait]
impl DelayQueueStore for PgStorage {
    async fn enqueue(
        &self,
        queue: QueueName,
        payload: &serde_json::Value,
        delay_secs: i64,
    ) -> Result<i64, StorageError> {
        let visible_at: DateTime<Utc> = Utc::now() + Duration::seconds(delay_secs.max(0));
        let row = sqlx::query(
            "INSERT INTO delayed_jobs (queue, payload, visible_at)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(queue.as_str())
        .bind(payload)
        .bind(visible_at)
        .fetch_one(&self.pool)
        .await?;
        let id: i64 = row.try_get("id")?;
        Ok(id)
    }

    async fn claim_due(
        &self,
        queue: QueueName,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<QueuedJob>, StorageError> {
        let now = Utc::now();
        let stale_threshold = now - Duration::seconds(visibility_timeout_secs);
        let rows = sqlx::query(
            "UPDATE delayed_jobs
               SET claimed_at = $1
             WHERE id IN (
                 SELECT id FROM delayed_jobs
                  WHERE queue = $2
                    AND visible_at <= $1
                    AND (claimed_at IS NULL OR claimed_at < $3)
                  ORDER BY visible_at ASC
                  LIMIT $4
                  FOR UPDATE SKIP LOCKED
             )
             RETURNING id, queue, payload, visible_at",
        )
        .bind(now)
        .bind(queue.as_str())
        .bind(stale_threshold)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_job).collect()
    }

    async fn complete(&self, id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM delayed_jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
