use async_trait::async_trait;
use chrono::{DateTime, Utc};
use doorman_core::QueueName;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

/// A claimed job from one of the delay queues.
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub id: i64,
    pub queue: QueueName,
    pub payload: serde_json::Value,
    pub visible_at: DateTime<Utc>,
}

impl QueuedJob {
    /// Decode the payload into its typed job struct.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StorageError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| StorageError::DataCorruption {
            context: format!("payload of {} job {}", self.queue.as_str(), self.id),
            source: Box::new(e),
        })
    }
}

/// Delay-capable message queue: per-job delay, at-least-once delivery,
/// no ordering guarantee.
///
/// A claimed job that is never completed becomes claimable again once its
/// visibility timeout lapses, so consumers must tolerate redelivery.
#[async_trait]
pub trait DelayQueueStore: Send + Sync {
    /// Enqueue a payload, visible after `delay_secs`. Returns the job ID.
    async fn enqueue(
        &self,
        queue: QueueName,
        payload: &serde_json::Value,
        delay_secs: i64,
    ) -> Result<i64, StorageError>;

    /// Claim up to `limit` due jobs from one queue.
    async fn claim_due(
        &self,
        queue: QueueName,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<QueuedJob>, StorageError>;

    /// Delete a job after successful processing.
    async fn complete(&self, id: i64) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorman_core::CountdownJob;

    #[test]
    fn decode_maps_bad_payload_to_corruption() {
        let job = QueuedJob {
            id: 3,
            queue: QueueName::Countdown,
            payload: serde_json::json!({"chat_id": "not a number"}),
            visible_at: Utc::now(),
        };
        let err = job.decode::<CountdownJob>().unwrap_err();
        assert!(matches!(err, StorageError::DataCorruption { .. }));
    }
}
