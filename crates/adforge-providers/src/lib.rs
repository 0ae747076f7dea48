//! Adforge Providers
//!
//! Image-generation backends behind a single `generate` capability, plus the
//! ordered fallback chain that terminates in a non-failing placeholder stage.
//! New providers implement `GenerationProvider` and get appended to the
//! chain; call sites never branch on provider identity.

mod chain;
mod error;
mod gemini;
mod openai;
mod traits;

pub use chain::ProviderChain;
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use openai::DalleProvider;
pub use traits::GenerationProvider;
