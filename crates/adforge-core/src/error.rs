//! Shared error and attribution types.
//!
//! Each service crate defines its own operational error enum (provider,
//! store, compositing). The types here are the ones that cross crate
//! boundaries: fatal brief validation, moderation violations, and the
//! per-unit error records carried in the campaign result.

use serde::Serialize;
use thiserror::Error;

use crate::models::AspectRatio;

/// Fatal brief-level error. Raised before any generation starts.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Campaign brief must include at least one product")]
    NoProducts,

    #[error("Campaign brief must include a message")]
    MissingMessage,

    #[error("Product at index {0} is missing a name")]
    UnnamedProduct(usize),

    #[error("Duplicate product name: {0}")]
    DuplicateProduct(String),

    #[error("Invalid brand color {0:?}: expected #RRGGBB")]
    InvalidBrandColor(String),

    #[error("Unsupported brief format: {0}. Use .json, .yaml, or .yml")]
    UnsupportedFormat(String),

    #[error("Malformed brief: {0}")]
    Malformed(String),
}

/// A moderation flag on one free-text field of the brief.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    /// Human-readable field label, e.g. "Product 2 Description".
    pub field: String,
    /// The flagged text.
    pub content: String,
    /// Classifier categories that fired, e.g. "openai:hate".
    pub categories: Vec<String>,
}

/// Pipeline stage used to attribute per-unit errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Hero,
    Compose,
    Version,
    Persist,
    Upload,
    /// Task-level failures (panicked or cancelled product task).
    Orchestration,
}

/// A recoverable error scoped to one (product, aspect ratio) unit.
///
/// These never abort sibling units; the orchestrator records them and
/// carries on (ratio is None for product-level failures such as an
/// undecodable hero image).
#[derive(Debug, Clone, Serialize)]
pub struct UnitError {
    pub product: String,
    pub ratio: Option<AspectRatio>,
    pub stage: Stage,
    pub reason: String,
}

impl UnitError {
    pub fn product_level(product: &str, stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            product: product.to_string(),
            ratio: None,
            stage,
            reason: reason.into(),
        }
    }

    pub fn unit(product: &str, ratio: AspectRatio, stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            product: product.to_string(),
            ratio: Some(ratio),
            stage,
            reason: reason.into(),
        }
    }
}
