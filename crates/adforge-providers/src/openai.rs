//! OpenAI DALL-E image generation. The API returns a URL; the image is
//! fetched in a second request.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ProviderError;
use crate::traits::GenerationProvider;

const DEFAULT_MODEL: &str = "dall-e-3";
const GENERATIONS_URL: &str = "https://api.openai.com/v1/images/generations";
const VALID_SIZES: [&str; 3] = ["1024x1024", "1792x1024", "1024x1792"];

pub struct DalleProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    size: String,
}

#[derive(Deserialize)]
struct GenerationsResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

impl DalleProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            size: "1024x1024".to_string(),
        }
    }

    /// Request a specific output size; invalid sizes fall back to 1024x1024.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        let size = size.into();
        self.size = if VALID_SIZES.contains(&size.as_str()) {
            size
        } else {
            "1024x1024".to_string()
        };
        self
    }
}

#[async_trait]
impl GenerationProvider for DalleProvider {
    fn name(&self) -> &str {
        "dall-e"
    }

    async fn generate(&self, prompt: &str) -> Result<Bytes, ProviderError> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "size": self.size,
            "quality": "standard",
            "n": 1,
        });

        let response = self
            .client
            .post(GENERATIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), message));
        }

        let parsed: GenerationsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let url = parsed
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("No image URL in OpenAI response".to_string())
            })?;

        let image_response = self.client.get(&url).send().await?;
        let status = image_response.status();
        if !status.is_success() {
            return Err(ProviderError::from_status(
                status.as_u16(),
                format!("Image download from {url} failed"),
            ));
        }
        let bytes = image_response.bytes().await?;

        info!(model = %self.model, size_bytes = bytes.len(), "DALL-E image generated");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_size_falls_back() {
        let provider = DalleProvider::new("k").with_size("640x480");
        assert_eq!(provider.size, "1024x1024");
        let provider = DalleProvider::new("k").with_size("1792x1024");
        assert_eq!(provider.size, "1792x1024");
    }
}
