//! Adforge Pipeline
//!
//! The generation-and-compositing pipeline: brief parsing, the moderation
//! gate, hero resolution with provider fallback, remote-aware version
//! allocation, and the concurrent per-product orchestration loop.

pub mod brief;
pub mod config;
pub mod hero;
pub mod moderation;
pub mod orchestrator;
pub mod translate;
pub mod version;

pub use brief::{parse_brief, parse_brief_file, BriefFormat};
pub use config::PipelineConfig;
pub use hero::HeroResolver;
pub use moderation::{
    moderate_brief, AllowAllGate, CompositeGate, ModerationGate, OpenAiModeration,
    PerspectiveModeration, Verdict,
};
pub use orchestrator::{Pipeline, PipelineBuilder, PipelineError};
pub use translate::{RegionalLexicon, Translator};
pub use version::{AllocatedVersion, VersionAllocator};
