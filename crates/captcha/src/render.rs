use crate::error::CaptchaError;

/// Client for the external captcha render service.
///
/// The service takes the challenge text and returns a distorted PNG;
/// doorman itself never rasterizes anything.
pub struct RenderClient {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for RenderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderClient").field("base_url", &self.base_url).finish()
    }
}

impl RenderClient {
    /// Creates a render client for the given service URL.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: String) -> Result<Self, CaptchaError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Render `text` into a challenge image.
    ///
    /// # Errors
    /// Returns an error if the request fails or the service answers with a
    /// non-success status.
    pub async fn render(&self, text: &str) -> Result<Vec<u8>, CaptchaError> {
        let response = self
            .client
            .post(format!("{}/render", self.base_url))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CaptchaError::RenderStatus { code: status.as_u16(), body });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
