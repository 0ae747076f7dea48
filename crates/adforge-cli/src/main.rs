//! Adforge CLI: runs a campaign brief through the creative pipeline.
//!
//! Providers are enabled by the presence of GEMINI_API_KEY / OPENAI_API_KEY;
//! the remote store by ADFORGE_S3_BUCKET (plus ADFORGE_S3_REGION and the
//! optional ADFORGE_S3_ENDPOINT for S3-compatible providers). Moderation
//! backends follow OPENAI_API_KEY and PERSPECTIVE_API_KEY.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use adforge_cli::init_tracing;
use adforge_compositing::{Compositor, FontCatalog};
use adforge_core::models::{CampaignResult, CampaignStatus};
use adforge_pipeline::{
    parse_brief_file, CompositeGate, HeroResolver, OpenAiModeration, PerspectiveModeration,
    Pipeline, PipelineConfig,
};
use adforge_providers::{DalleProvider, GeminiProvider, GenerationProvider, ProviderChain};
use adforge_storage::{RemoteStore, S3RemoteStore};

#[derive(Parser)]
#[command(name = "adforge", about = "Campaign creative generation pipeline")]
struct Cli {
    /// Path to the campaign brief (.json, .yaml, or .yml)
    brief: PathBuf,

    /// Directory holding user-supplied hero assets
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Output workspace for composited creatives
    #[arg(long)]
    outputs_dir: Option<PathBuf>,

    /// Directory holding .ttf/.otf overlay fonts
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Skip uploading outputs to the remote store
    #[arg(long)]
    no_upload: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    status: CampaignStatus,
    #[serde(flatten)]
    result: &'a CampaignResult,
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn build_chain(timeout: std::time::Duration) -> ProviderChain {
    let mut providers: Vec<Arc<dyn GenerationProvider>> = Vec::new();
    if let Some(key) = env_key("GEMINI_API_KEY") {
        providers.push(Arc::new(GeminiProvider::new(key)));
    }
    if let Some(key) = env_key("OPENAI_API_KEY") {
        providers.push(Arc::new(DalleProvider::new(key)));
    }
    if providers.is_empty() {
        warn!("No provider API keys set, AI generation will fall back to placeholders");
    }
    ProviderChain::new(providers).with_call_timeout(timeout)
}

fn build_gate() -> CompositeGate {
    let mut gate = CompositeGate::new();
    if let Some(key) = env_key("OPENAI_API_KEY") {
        gate = gate.push(OpenAiModeration::new(key));
    }
    if let Some(key) = env_key("PERSPECTIVE_API_KEY") {
        gate = gate.push(PerspectiveModeration::new(key));
    }
    if gate.is_empty() {
        warn!("No moderation API keys set, briefs will not be moderated");
    }
    gate
}

async fn build_remote() -> anyhow::Result<Option<Arc<dyn RemoteStore>>> {
    let Some(bucket) = env_key("ADFORGE_S3_BUCKET") else {
        info!("ADFORGE_S3_BUCKET not set, running without a remote store");
        return Ok(None);
    };
    let region = env_key("ADFORGE_S3_REGION").unwrap_or_else(|| "us-east-1".to_string());
    let endpoint = env_key("ADFORGE_S3_ENDPOINT");
    let store = S3RemoteStore::new(bucket, region, endpoint)
        .await
        .context("Failed to create remote store client")?;
    Ok(Some(Arc::new(store)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = PipelineConfig::from_env();
    if let Some(dir) = cli.assets_dir {
        config.assets_dir = dir;
    }
    if let Some(dir) = cli.outputs_dir {
        config.outputs_dir = dir;
    }
    if let Some(dir) = cli.fonts_dir {
        config.fonts_dir = dir;
    }
    if cli.no_upload {
        config.upload_enabled = false;
    }

    let brief = parse_brief_file(&cli.brief)
        .with_context(|| format!("Failed to parse brief {}", cli.brief.display()))?;

    let remote = build_remote().await?;
    let chain = build_chain(config.provider_timeout);
    let hero = HeroResolver::new(chain, &config.assets_dir, remote.clone());
    let compositor = Compositor::new(FontCatalog::new(&config.fonts_dir));
    let pipeline = Pipeline::builder(config, hero, compositor, remote)
        .gate(build_gate())
        .build();

    let result = pipeline.run(&brief).await?;
    let summary = RunSummary {
        status: result.status(),
        result: &result,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if result.status() == CampaignStatus::Failed {
        std::process::exit(1);
    }
    Ok(())
}
