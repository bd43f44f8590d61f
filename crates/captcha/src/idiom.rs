use rand::Rng;
use serde::Deserialize;
use std::path::Path;

use crate::error::CaptchaError;
use crate::render::RenderClient;
use crate::{ChallengeProvider, IssuedChallenge};

/// Number of characters an idiom must have to be usable as a challenge.
const IDIOM_LEN: usize = 4;

/// One entry of the idiom word list.
#[derive(Debug, Clone, Deserialize)]
pub struct Idiom {
    pub id: i64,
    pub word: String,
}

/// Challenge provider backed by a fixed idiom list.
///
/// The secret handed to the store is the idiom's index, so the list must
/// be identical across all deployments sharing a record store.
pub struct IdiomCaptcha {
    idioms: Vec<Idiom>,
    render: RenderClient,
}

impl std::fmt::Debug for IdiomCaptcha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdiomCaptcha").field("idioms", &self.idioms.len()).finish()
    }
}

impl IdiomCaptcha {
    /// Load the idiom list from a JSON file, keeping only four-character
    /// entries.
    pub fn from_file(path: &Path, render: RenderClient) -> Result<Self, CaptchaError> {
        let raw = std::fs::read(path).map_err(|source| CaptchaError::IdiomFile {
            path: path.display().to_string(),
            source,
        })?;
        let idioms: Vec<Idiom> = serde_json::from_slice(&raw)?;
        Self::new(idioms, render)
    }

    pub fn new(idioms: Vec<Idiom>, render: RenderClient) -> Result<Self, CaptchaError> {
        let idioms: Vec<Idiom> =
            idioms.into_iter().filter(|i| i.word.chars().count() == IDIOM_LEN).collect();
        if idioms.is_empty() {
            return Err(CaptchaError::EmptyIdiomList);
        }
        Ok(Self { idioms, render })
    }

    fn pick(&self) -> (i32, &str) {
        let idx = rand::thread_rng().gen_range(0..self.idioms.len());
        (idx as i32, self.idioms[idx].word.as_str())
    }
}

#[async_trait::async_trait]
impl ChallengeProvider for IdiomCaptcha {
    async fn issue(&self) -> Result<IssuedChallenge, CaptchaError> {
        let (secret, word) = self.pick();
        let image = self.render.render(word).await?;
        Ok(IssuedChallenge { secret, image })
    }

    fn check(&self, secret: i32, answer: &str) -> bool {
        usize::try_from(secret)
            .ok()
            .and_then(|idx| self.idioms.get(idx))
            .is_some_and(|idiom| idiom.word == answer)
    }
}
