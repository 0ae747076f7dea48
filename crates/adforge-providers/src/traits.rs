use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ProviderError;

/// The single capability every image-generation backend implements.
///
/// Each provider is attempted at most once per chain call; retry/backoff is
/// the provider's own HTTP client's concern, not the chain's.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Stable provider name used in logs and provenance.
    fn name(&self) -> &str;

    /// Generate image bytes for a prompt.
    async fn generate(&self, prompt: &str) -> Result<Bytes, ProviderError>;
}
