//! Ordered provider fallback chain.
//!
//! Each provider is tried exactly once under a per-call timeout; any failure
//! falls through to the next. The terminal placeholder stage never fails, so
//! `generate` always yields an asset.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use adforge_compositing::render_placeholder;
use adforge_core::models::{AssetKind, GeneratedAsset, Provenance, ProviderFailure};

use crate::error::ProviderError;
use crate::traits::GenerationProvider;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ProviderChain {
    providers: Vec<Arc<dyn GenerationProvider>>,
    call_timeout: Duration,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn GenerationProvider>>) -> Self {
        Self {
            providers,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Bounded wait per provider call; elapsed calls count as provider
    /// failures and fall through the chain.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Generate an asset for a prompt. Infallible: exhausting all providers
    /// yields a PLACEHOLDER asset whose provenance records every failure.
    pub async fn generate(&self, prompt: &str) -> GeneratedAsset {
        let mut failures: Vec<ProviderFailure> = Vec::new();

        for provider in &self.providers {
            let name = provider.name().to_string();
            let outcome = timeout(self.call_timeout, provider.generate(prompt)).await;
            let error = match outcome {
                Ok(Ok(bytes)) => {
                    info!(provider = %name, "Hero image generated");
                    return GeneratedAsset::new(
                        AssetKind::AiGenerated,
                        bytes,
                        Provenance {
                            source: name,
                            failures,
                        },
                    );
                }
                Ok(Err(e)) => e,
                Err(_) => ProviderError::Timeout(self.call_timeout),
            };

            warn!(
                provider = %name,
                kind = error.kind(),
                error = %error,
                "Provider failed, falling through"
            );
            failures.push(ProviderFailure {
                provider: name,
                kind: error.kind().to_string(),
                message: error.to_string(),
            });
        }

        info!(
            attempts = failures.len(),
            "All providers failed, using placeholder"
        );
        GeneratedAsset::new(
            AssetKind::Placeholder,
            render_placeholder(prompt),
            Provenance {
                source: "placeholder".to_string(),
                failures,
            },
        )
    }
}
