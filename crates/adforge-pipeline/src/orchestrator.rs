//! Campaign run orchestration.
//!
//! One run: validate, moderate, localize, then fan out per product under a
//! concurrency cap. Each product resolves one hero and composes every aspect
//! ratio; unit failures are recorded and never abort sibling units or
//! products. Only validation and moderation are fatal.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use image::DynamicImage;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use adforge_compositing::{decode_image, Compositor};
use adforge_core::error::{Stage, UnitError, ValidationError, Violation};
use adforge_core::models::{
    AspectRatio, AssetKind, CampaignBrief, CampaignResult, GeneratedAsset, OutputArtifact,
    Product, ProductOutcome, ProductStatus,
};
use adforge_core::names::{self, normalize_name};
use adforge_storage::RemoteStore;

use crate::config::PipelineConfig;
use crate::hero::HeroResolver;
use crate::moderation::{moderate_brief, AllowAllGate, ModerationGate};
use crate::translate::{RegionalLexicon, Translator};
use crate::version::VersionAllocator;

/// Fatal run-level errors. Anything below this level is recorded in the
/// campaign result instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", format_violations(.0))]
    ModerationRejected(Vec<Violation>),

    #[error("Workspace error: {0}")]
    Workspace(#[from] std::io::Error),
}

fn format_violations(violations: &[Violation]) -> String {
    let mut lines = vec!["Content moderation detected inappropriate content:".to_string()];
    for v in violations {
        lines.push(format!("  {}: flagged for {}", v.field, v.categories.join(", ")));
    }
    lines.join("\n")
}

struct Inner {
    config: PipelineConfig,
    hero: HeroResolver,
    compositor: Compositor,
    allocator: VersionAllocator,
    translator: Box<dyn Translator>,
    gate: Box<dyn ModerationGate>,
    remote: Option<Arc<dyn RemoteStore>>,
}

pub struct Pipeline {
    inner: Arc<Inner>,
}

/// Assembles a pipeline. Translator and moderation default to the built-in
/// lexicon and an allow-all gate.
pub struct PipelineBuilder {
    config: PipelineConfig,
    hero: HeroResolver,
    compositor: Compositor,
    remote: Option<Arc<dyn RemoteStore>>,
    translator: Box<dyn Translator>,
    gate: Box<dyn ModerationGate>,
}

impl PipelineBuilder {
    pub fn translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    pub fn gate(mut self, gate: impl ModerationGate + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    pub fn build(self) -> Pipeline {
        let allocator = VersionAllocator::new(&self.config.outputs_dir, self.remote.clone());
        Pipeline {
            inner: Arc::new(Inner {
                config: self.config,
                hero: self.hero,
                compositor: self.compositor,
                allocator,
                translator: self.translator,
                gate: self.gate,
                remote: self.remote,
            }),
        }
    }
}

impl Pipeline {
    pub fn builder(
        config: PipelineConfig,
        hero: HeroResolver,
        compositor: Compositor,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> PipelineBuilder {
        PipelineBuilder {
            config,
            hero,
            compositor,
            remote,
            translator: Box::new(RegionalLexicon),
            gate: Box::new(AllowAllGate),
        }
    }

    /// Execute one campaign run.
    pub async fn run(&self, brief: &CampaignBrief) -> Result<CampaignResult, PipelineError> {
        brief.validate()?;

        let violations = moderate_brief(self.inner.gate.as_ref(), brief).await;
        if !violations.is_empty() {
            return Err(PipelineError::ModerationRejected(violations));
        }

        // Fresh output workspace per run; versions live in history (local
        // scan happens against this same dir, remote history is durable).
        let outputs = &self.inner.config.outputs_dir;
        match tokio::fs::remove_dir_all(outputs).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(outputs).await?;

        let message = match brief.localized_messages.get(&brief.region) {
            Some(localized) => localized.clone(),
            None => {
                self.inner
                    .translator
                    .translate(&brief.message, &brief.region)
                    .await
            }
        };
        let brand_rgb = brief.brand_rgb();
        let (logo, logo_degradation) = self.load_logo(brief).await;

        info!(
            region = %brief.region,
            products = brief.products.len(),
            message = %message,
            "starting campaign run"
        );

        let semaphore = Arc::new(Semaphore::new(self.inner.config.max_concurrency));
        let mut handles: Vec<(String, JoinHandle<ProductReport>)> = Vec::new();
        for product in &brief.products {
            let inner = self.inner.clone();
            let semaphore = semaphore.clone();
            let product = product.clone();
            let brief = brief.clone();
            let message = message.clone();
            let logo = logo.clone();
            let name = product.name.clone();
            handles.push((
                name,
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    process_product(&inner, &product, &brief, &message, brand_rgb, logo.as_deref())
                        .await
                }),
            ));
        }

        let mut outcomes = Vec::new();
        let mut artifacts = Vec::new();
        let mut errors = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(mut report) => {
                    if let Some(note) = &logo_degradation {
                        report.outcome.degradations.push(note.clone());
                    }
                    outcomes.push(report.outcome);
                    artifacts.extend(report.artifacts);
                    errors.extend(report.errors);
                }
                Err(e) => {
                    error!(product = %name, error = %e, "product task aborted");
                    errors.push(UnitError::product_level(
                        &name,
                        Stage::Orchestration,
                        e.to_string(),
                    ));
                    outcomes.push(ProductOutcome {
                        product: name,
                        status: ProductStatus::Failed,
                        degradations: Vec::new(),
                    });
                }
            }
        }

        let result = CampaignResult {
            outcomes,
            artifacts,
            errors,
        };
        info!(
            status = ?result.status(),
            artifacts = result.artifacts.len(),
            errors = result.errors.len(),
            "campaign run finished"
        );
        Ok(result)
    }

    async fn load_logo(&self, brief: &CampaignBrief) -> (Option<Arc<DynamicImage>>, Option<String>) {
        let Some(path) = &brief.logo else {
            return (None, None);
        };
        let loaded = match tokio::fs::read(path).await {
            Ok(bytes) => decode_image(&bytes).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match loaded {
            Ok(img) => (Some(Arc::new(img)), None),
            Err(reason) => {
                warn!(path = %path, reason = %reason, "logo unavailable, compositing without it");
                (None, Some(format!("logo unavailable: {reason}")))
            }
        }
    }
}

struct ProductReport {
    outcome: ProductOutcome,
    artifacts: Vec<OutputArtifact>,
    errors: Vec<UnitError>,
}

enum UnitOutcome {
    Artifact(Box<OutputArtifact>, Vec<String>),
    Failed(UnitError),
}

async fn process_product(
    inner: &Inner,
    product: &Product,
    brief: &CampaignBrief,
    message: &str,
    brand_rgb: (u8, u8, u8),
    logo: Option<&DynamicImage>,
) -> ProductReport {
    let mut degradations = Vec::new();

    let asset = inner.hero.resolve(product, brief).await;
    if asset.kind == AssetKind::Placeholder {
        degradations.push(format!(
            "hero fell back to placeholder after {} provider failure(s)",
            asset.provenance.failures.len()
        ));
    }

    // Decode once; every ratio crops from the same source.
    let source = match decode_image(&asset.bytes) {
        Ok(img) => img,
        Err(e) => {
            error!(product = %product.name, error = %e, "hero image undecodable");
            return ProductReport {
                outcome: ProductOutcome {
                    product: product.name.clone(),
                    status: ProductStatus::Failed,
                    degradations,
                },
                artifacts: Vec::new(),
                errors: vec![UnitError::product_level(
                    &product.name,
                    Stage::Compose,
                    e.to_string(),
                )],
            };
        }
    };

    let units = AspectRatio::ALL.iter().map(|&ratio| {
        process_unit(inner, product, &asset, &source, ratio, message, brand_rgb, logo)
    });
    let results = join_all(units).await;

    let mut artifacts = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            UnitOutcome::Artifact(artifact, notes) => {
                artifacts.push(*artifact);
                degradations.extend(notes);
            }
            UnitOutcome::Failed(e) => errors.push(e),
        }
    }

    let status = if artifacts.len() == AspectRatio::ALL.len() {
        ProductStatus::Success
    } else if artifacts.is_empty() {
        ProductStatus::Failed
    } else {
        ProductStatus::Partial
    };

    ProductReport {
        outcome: ProductOutcome {
            product: product.name.clone(),
            status,
            degradations,
        },
        artifacts,
        errors,
    }
}

#[allow(clippy::too_many_arguments)]
async fn process_unit(
    inner: &Inner,
    product: &Product,
    asset: &GeneratedAsset,
    source: &DynamicImage,
    ratio: AspectRatio,
    message: &str,
    brand_rgb: (u8, u8, u8),
    logo: Option<&DynamicImage>,
) -> UnitOutcome {
    let mut notes = Vec::new();

    let bytes = match inner
        .compositor
        .compose(source, ratio, message, brand_rgb, logo)
    {
        Ok(bytes) => bytes,
        Err(e) => {
            return UnitOutcome::Failed(UnitError::unit(
                &product.name,
                ratio,
                Stage::Compose,
                e.to_string(),
            ))
        }
    };

    let allocated = inner.allocator.next_version(&product.name, ratio).await;
    if allocated.remote_degraded {
        notes.push(format!("version allocation local-only for {ratio}"));
    }
    let version = allocated.version;

    let file = names::artifact_file_name(&product.name, ratio, version);
    let dir = inner
        .config
        .outputs_dir
        .join(normalize_name(&product.name));
    let path = dir.join(&file);
    if let Err(e) = tokio::fs::create_dir_all(&dir).await {
        return UnitOutcome::Failed(UnitError::unit(
            &product.name,
            ratio,
            Stage::Persist,
            e.to_string(),
        ));
    }
    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        return UnitOutcome::Failed(UnitError::unit(
            &product.name,
            ratio,
            Stage::Persist,
            e.to_string(),
        ));
    }

    let mut remote_url = None;
    if inner.config.upload_enabled {
        if let Some(remote) = &inner.remote {
            let key = names::remote_key(&product.name, ratio, version);
            match remote.upload_if_absent(&key, bytes, "image/png").await {
                Ok((url, written)) => {
                    if !written {
                        notes.push(format!("remote object already existed: {key}"));
                    }
                    remote_url = Some(url);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "upload failed, artifact kept locally");
                    notes.push(format!("upload skipped for {file}: {e}"));
                }
            }
        }
    }

    UnitOutcome::Artifact(
        Box::new(OutputArtifact {
            product: product.name.clone(),
            ratio,
            version,
            path,
            remote_url,
            message: message.to_string(),
            source_kind: asset.kind,
            provider: asset.provenance.source.clone(),
            created_at: Utc::now(),
        }),
        notes,
    )
}
