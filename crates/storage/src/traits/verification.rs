use async_trait::async_trait;
use doorman_core::PendingVerification;

use crate::error::StorageError;

/// Durable mapping from (chat, user) to a pending verification record.
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Fetch the record for a member, if a challenge is outstanding.
    async fn get(&self, chat_id: i64, user_id: i64)
    -> Result<Option<PendingVerification>, StorageError>;

    /// Create the record for a freshly challenged member.
    ///
    /// Upsert: a stale record left by an unobserved leave/rejoin is
    /// superseded wholesale, deadline included.
    async fn create(&self, record: &PendingVerification) -> Result<(), StorageError>;

    /// Replace the expected answer in place. Deadline and challenge
    /// message are untouched.
    async fn update_challenge(
        &self,
        chat_id: i64,
        user_id: i64,
        new_secret: i32,
    ) -> Result<(), StorageError>;

    /// Delete the record. Deleting an absent record is a valid outcome of
    /// a lost race, not an error.
    async fn delete(&self, chat_id: i64, user_id: i64) -> Result<(), StorageError>;

    /// Reverse lookup by challenge message, for admin actions that only
    /// know the message they were clicked on.
    async fn find_by_message(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> Result<Option<PendingVerification>, StorageError>;
}
