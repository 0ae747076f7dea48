//! Campaign run results: per-product outcomes, persisted artifacts, and
//! the per-unit errors that were recorded along the way.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::UnitError;
use crate::models::{AspectRatio, AssetKind};

/// Status of one product within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// All aspect ratios produced an artifact.
    Success,
    /// Some aspect ratios failed, others succeeded.
    Partial,
    /// No artifact was produced for this product.
    Failed,
}

/// Campaign-level rollup of product statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Success,
    Partial,
    Failed,
}

/// One persisted output: a composited creative at a versioned key.
#[derive(Debug, Clone, Serialize)]
pub struct OutputArtifact {
    pub product: String,
    pub ratio: AspectRatio,
    /// Monotonic per (product, ratio); max(local, remote) + 1 at allocation.
    pub version: u32,
    pub path: PathBuf,
    /// Remote store URL if the artifact was uploaded this run.
    pub remote_url: Option<String>,
    /// The localized message that was rendered onto the image.
    pub message: String,
    /// Hero source: user upload, AI provider, or placeholder.
    pub source_kind: AssetKind,
    pub provider: String,
    pub created_at: DateTime<Utc>,
}

/// Per-product rollup, including degradations that did not fail the unit
/// (placeholder hero, local-only versioning, skipped upload).
#[derive(Debug, Clone, Serialize)]
pub struct ProductOutcome {
    pub product: String,
    pub status: ProductStatus,
    pub degradations: Vec<String>,
}

/// Aggregate result of one pipeline run. Successful artifacts are always
/// reported even when sibling products failed.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignResult {
    pub outcomes: Vec<ProductOutcome>,
    pub artifacts: Vec<OutputArtifact>,
    pub errors: Vec<UnitError>,
}

impl CampaignResult {
    pub fn status(&self) -> CampaignStatus {
        let total = self.outcomes.len();
        let succeeded = self
            .outcomes
            .iter()
            .filter(|o| o.status == ProductStatus::Success)
            .count();
        let failed = self
            .outcomes
            .iter()
            .filter(|o| o.status == ProductStatus::Failed)
            .count();
        if succeeded == total {
            CampaignStatus::Success
        } else if failed == total {
            CampaignStatus::Failed
        } else {
            CampaignStatus::Partial
        }
    }

    pub fn artifacts_for(&self, product: &str) -> Vec<&OutputArtifact> {
        self.artifacts
            .iter()
            .filter(|a| a.product == product)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(product: &str, status: ProductStatus) -> ProductOutcome {
        ProductOutcome {
            product: product.into(),
            status,
            degradations: Vec::new(),
        }
    }

    #[test]
    fn test_campaign_status_rollup() {
        let result = CampaignResult {
            outcomes: vec![
                outcome("a", ProductStatus::Success),
                outcome("b", ProductStatus::Success),
            ],
            artifacts: vec![],
            errors: vec![],
        };
        assert_eq!(result.status(), CampaignStatus::Success);

        let result = CampaignResult {
            outcomes: vec![
                outcome("a", ProductStatus::Success),
                outcome("b", ProductStatus::Failed),
            ],
            artifacts: vec![],
            errors: vec![],
        };
        assert_eq!(result.status(), CampaignStatus::Partial);

        let result = CampaignResult {
            outcomes: vec![outcome("a", ProductStatus::Failed)],
            artifacts: vec![],
            errors: vec![],
        };
        assert_eq!(result.status(), CampaignStatus::Failed);
    }

    #[test]
    fn test_partial_when_product_partial() {
        let result = CampaignResult {
            outcomes: vec![outcome("a", ProductStatus::Partial)],
            artifacts: vec![],
            errors: vec![],
        };
        assert_eq!(result.status(), CampaignStatus::Partial);
    }
}
