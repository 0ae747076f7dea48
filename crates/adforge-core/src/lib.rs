//! Adforge Core
//!
//! Domain models shared across the creative automation pipeline: campaign
//! briefs, aspect ratios, generated assets with provenance, output artifacts,
//! and the campaign-level result types.

pub mod error;
pub mod models;
pub mod names;

pub use error::{Stage, UnitError, ValidationError, Violation};
pub use models::{
    AspectRatio, AssetKind, CampaignBrief, CampaignResult, CampaignStatus, CropStrategy,
    GeneratedAsset, OutputArtifact, Product, ProductOutcome, ProductStatus, Provenance,
    ProviderFailure,
};
pub use names::{artifact_file_name, normalize_name, parse_artifact_version, remote_key};
