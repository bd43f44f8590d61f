//! Background workers draining the delay queues.
//!
//! Each worker polls its queue on a fixed interval, claims due jobs with a
//! visibility timeout, and completes a job only after its handler returned
//! Ok. A handler failure leaves the claim to lapse, so the job is
//! redelivered; the coordinator's handlers are idempotent, which makes
//! that safe. An undecodable payload is completed immediately (dropped)
//! instead of poisoning the queue.

use std::future::Future;
use std::sync::Arc;

use doorman_core::{env_parse_or, CleanupJob, CountdownJob, QueueName};
use doorman_storage::QueuedJob;

use crate::AppState;

const POLL_INTERVAL_SECS: u64 = 1;
const VISIBILITY_TIMEOUT_SECS: i64 = 60;

fn claim_batch_size() -> usize {
    env_parse_or("DOORMAN_QUEUE_BATCH", 16)
}

/// Spawns the countdown queue consumer.
pub fn start_countdown_worker(state: Arc<AppState>) {
    tokio::spawn(async move {
        run_queue_loop(state, QueueName::Countdown, |state, job| async move {
            let tick: CountdownJob = job.decode()?;
            state.verifier.on_countdown_tick(tick.chat_id, tick.user_id).await?;
            Ok(())
        })
        .await;
    });
}

/// Spawns the cleanup queue consumer.
pub fn start_cleanup_worker(state: Arc<AppState>) {
    tokio::spawn(async move {
        run_queue_loop(state, QueueName::Cleanup, |state, job| async move {
            let cleanup: CleanupJob = job.decode()?;
            state.verifier.on_cleanup(cleanup.chat_id, cleanup.message_id).await;
            Ok(())
        })
        .await;
    });
}

enum JobError {
    /// Payload did not decode; the job can never succeed.
    Poison(doorman_storage::StorageError),
    /// Handler failed; the job may succeed on redelivery.
    Handler(doorman_verifier::VerifierError),
}

impl From<doorman_storage::StorageError> for JobError {
    fn from(e: doorman_storage::StorageError) -> Self {
        Self::Poison(e)
    }
}

impl From<doorman_verifier::VerifierError> for JobError {
    fn from(e: doorman_verifier::VerifierError) -> Self {
        Self::Handler(e)
    }
}

async fn run_queue_loop<F, Fut>(state: Arc<AppState>, queue: QueueName, handler: F)
where
    F: Fn(Arc<AppState>, QueuedJob) -> Fut,
    Fut: Future<Output = Result<(), JobError>>,
{
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(POLL_INTERVAL_SECS));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;

        let jobs = match state
            .queue
            .claim_due(queue, claim_batch_size(), VISIBILITY_TIMEOUT_SECS)
            .await
        {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!(queue = queue.as_str(), error = %e, "queue claim failed");
                continue;
            },
        };

        for job in jobs {
            let job_id = job.id;
            match handler(Arc::clone(&state), job).await {
                Ok(()) => complete(&state, queue, job_id).await,
                Err(JobError::Poison(e)) => {
                    tracing::error!(queue = queue.as_str(), job_id, error = %e, "dropping undecodable job");
                    complete(&state, queue, job_id).await;
                },
                Err(JobError::Handler(e)) => {
                    // Left claimed; redelivered after the visibility timeout.
                    tracing::warn!(queue = queue.as_str(), job_id, error = %e, "job failed, will redeliver");
                },
            }
        }
    }
}

async fn complete(state: &AppState, queue: QueueName, job_id: i64) {
    if let Err(e) = state.queue.complete(job_id).await {
        tracing::warn!(queue = queue.as_str(), job_id, error = %e, "job completion failed");
    }
}
