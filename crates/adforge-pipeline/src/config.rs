//! Pipeline runtime configuration, env-driven with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory scanned for user-supplied hero assets.
    pub assets_dir: PathBuf,
    /// Per-run output workspace; cleared at the start of each run.
    pub outputs_dir: PathBuf,
    /// Directory holding .ttf/.otf font files for the overlay.
    pub fonts_dir: PathBuf,
    /// Cap on concurrently processed products.
    pub max_concurrency: usize,
    /// Bounded wait per external generation call.
    pub provider_timeout: Duration,
    /// Whether composited outputs are pushed to the remote store.
    pub upload_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets/input"),
            outputs_dir: PathBuf::from("outputs"),
            fonts_dir: PathBuf::from("assets/fonts"),
            max_concurrency: 4,
            provider_timeout: Duration::from_secs(60),
            upload_enabled: true,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl PipelineConfig {
    /// Build from ADFORGE_* environment variables (loading .env first),
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            assets_dir: env_var("ADFORGE_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
            outputs_dir: env_var("ADFORGE_OUTPUTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.outputs_dir),
            fonts_dir: env_var("ADFORGE_FONTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.fonts_dir),
            max_concurrency: env_var("ADFORGE_MAX_CONCURRENCY")
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_concurrency),
            provider_timeout: env_var("ADFORGE_PROVIDER_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.provider_timeout),
            upload_enabled: env_var("ADFORGE_UPLOAD_ENABLED")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(defaults.upload_enabled),
        }
    }
}
