mod asset;
mod brief;
mod result;

pub use asset::{AssetKind, GeneratedAsset, Provenance, ProviderFailure};
pub use brief::{AspectRatio, CampaignBrief, CropStrategy, Product};
pub use result::{CampaignResult, CampaignStatus, OutputArtifact, ProductOutcome, ProductStatus};
