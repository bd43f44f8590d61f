//! Typed error enum for the captcha crate.

use thiserror::Error;

/// Errors from challenge generation.
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("failed to read idiom file {path}: {source}")]
    IdiomFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode idiom file: {0}")]
    IdiomDecode(#[from] serde_json::Error),
    #[error("idiom list is empty after filtering")]
    EmptyIdiomList,
    #[error("render request failed: {0}")]
    RenderRequest(#[from] reqwest::Error),
    #[error("render service returned HTTP {code}: {body}")]
    RenderStatus { code: u16, body: String },
}

impl CaptchaError {
    /// Whether this error is transient and a retry may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RenderRequest(_) => true,
            Self::RenderStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503),
            _ => false,
        }
    }
}
