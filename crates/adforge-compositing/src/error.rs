use thiserror::Error;

/// Compositing errors. Recoverable at product granularity: the orchestrator
/// records them and continues with sibling units.
#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Failed to encode output image: {0}")]
    Encode(String),

    #[error("Source image has zero dimensions")]
    EmptySource,
}
