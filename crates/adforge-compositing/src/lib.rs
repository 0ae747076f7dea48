//! Adforge Compositing
//!
//! CPU-bound image work: cover cropping per aspect ratio (including the
//! saliency-guided vertical placement for widescreen), script-aware text
//! overlay, logo placement, placeholder rendering, and PNG encoding.

mod compose;
mod error;
mod fonts;
mod logo;
mod placeholder;
mod script;

pub use compose::{decode_image, encode_png, Compositor};
pub use error::CompositeError;
pub use fonts::FontCatalog;
pub use logo::LogoCorner;
pub use placeholder::{render_placeholder, PLACEHOLDER_SIZE};
pub use script::Script;
