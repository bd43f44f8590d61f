//! Challenge generation and checking for doorman.
//!
//! A challenge is a (secret index, rendered image) pair. The secret indexes
//! into a fixed idiom list; rasterization is delegated to an external
//! render service, so this crate never touches image encoding itself.

mod error;
mod idiom;
mod render;

use async_trait::async_trait;

pub use error::CaptchaError;
pub use idiom::{Idiom, IdiomCaptcha};
pub use render::RenderClient;

/// A freshly issued challenge.
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    /// Opaque index identifying the expected answer.
    pub secret: i32,
    /// Rendered challenge image (PNG).
    pub image: Vec<u8>,
}

/// Produces challenges and checks free-text answers against a stored secret.
#[async_trait]
pub trait ChallengeProvider: Send + Sync {
    /// Generate a new challenge. Async because rendering is remote.
    async fn issue(&self) -> Result<IssuedChallenge, CaptchaError>;

    /// Whether `answer` matches the challenge identified by `secret`.
    fn check(&self, secret: i32, answer: &str) -> bool;
}
