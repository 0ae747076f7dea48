//! Hero assets and their provenance.

use bytes::Bytes;
use serde::Serialize;

/// How a hero image was sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    UserUploaded,
    AiGenerated,
    Placeholder,
}

/// One failed provider attempt, kept for provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub kind: String,
    pub message: String,
}

/// Record of which provider (or upload) produced an asset, including every
/// provider that failed before the winning stage.
#[derive(Debug, Clone, Serialize)]
pub struct Provenance {
    /// Name of the producing source, e.g. "user-upload", "gemini", "dall-e",
    /// "placeholder".
    pub source: String,
    pub failures: Vec<ProviderFailure>,
}

impl Provenance {
    pub fn user_upload(reference: &str) -> Self {
        Self {
            source: format!("user-upload:{reference}"),
            failures: Vec::new(),
        }
    }
}

/// A resolved hero image for one product. Transient working artifact; only
/// composited outputs are versioned and persisted.
#[derive(Debug, Clone)]
pub struct GeneratedAsset {
    pub kind: AssetKind,
    pub bytes: Bytes,
    pub provenance: Provenance,
}

impl GeneratedAsset {
    pub fn new(kind: AssetKind, bytes: impl Into<Bytes>, provenance: Provenance) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
            provenance,
        }
    }
}
