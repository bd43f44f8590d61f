//! Typed error enum for the coordinator.
//!
//! Only record-store and challenge-provider failures propagate: they mean
//! the transition itself could not run. Platform side effects and queue
//! re-enqueues are best-effort and are logged where they fail.

use doorman_captcha::CaptchaError;
use doorman_storage::StorageError;
use thiserror::Error;

/// Coordinator error.
#[derive(Debug, Error)]
pub enum VerifierError {
    /// Record store operation failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Challenge generation failed.
    #[error("captcha: {0}")]
    Captcha(#[from] CaptchaError),
}

impl VerifierError {
    /// Whether this error is likely transient (worth redelivering the
    /// triggering event).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Captcha(e) => e.is_transient(),
        }
    }
}
