//! Centralized naming for output artifacts.
//!
//! All layers use the same layout so local scans and remote listings parse
//! identically:
//!
//! - file name: `{product}_{ratio}_v{N}.png` (product normalized)
//! - local path: `{outputs}/{product}/{file}`
//! - remote key: `outputs/{product}/{file}`

use std::sync::OnceLock;

use regex::Regex;

use crate::models::AspectRatio;

pub const OUTPUT_EXT: &str = "png";

/// Normalize a product name for use in filenames and keys: lowercase,
/// spaces and hyphens become underscores.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

/// Versioned artifact file name for a (product, ratio) key.
pub fn artifact_file_name(product: &str, ratio: AspectRatio, version: u32) -> String {
    format!(
        "{}_{}_v{}.{}",
        normalize_name(product),
        ratio.label(),
        version,
        OUTPUT_EXT
    )
}

/// Remote store key for a versioned artifact.
pub fn remote_key(product: &str, ratio: AspectRatio, version: u32) -> String {
    format!(
        "outputs/{}/{}",
        normalize_name(product),
        artifact_file_name(product, ratio, version)
    )
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_v(\d+)\.[A-Za-z0-9]+$").expect("valid version regex"))
}

/// Extract the version number from an artifact file name or key, provided it
/// belongs to the given (product, ratio) key. Returns None for foreign files.
pub fn parse_artifact_version(name: &str, product: &str, ratio: AspectRatio) -> Option<u32> {
    let file = name.rsplit('/').next()?;
    let prefix = format!("{}_{}_v", normalize_name(product), ratio.label());
    if !file.starts_with(&prefix) {
        return None;
    }
    let caps = version_re().captures(file)?;
    caps.get(1)?.as_str().parse().ok()
}
