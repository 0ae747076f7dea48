//! Campaign brief model: the declarative input to a pipeline run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

fn default_region() -> String {
    "Global".to_string()
}

fn default_brand_color() -> String {
    "#FFFFFF".to_string()
}

/// One product in the brief. `description` doubles as the generation prompt
/// seed; `hero_image` points at a user-supplied asset (local path or remote
/// store key) that short-circuits AI generation when retrievable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "hero_image_reference")]
    pub hero_image: Option<String>,
}

/// Parsed campaign brief. Immutable after parse; validation runs once at the
/// parse boundary and the pipeline trusts the invariants from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignBrief {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub audience: Option<String>,
    pub message: String,
    #[serde(default = "default_brand_color")]
    pub brand_color: String,
    pub products: Vec<Product>,
    #[serde(default)]
    pub localized_messages: HashMap<String, String>,
    /// Optional brand logo, composited into a corner of every output.
    #[serde(default)]
    pub logo: Option<String>,
}

impl CampaignBrief {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.products.is_empty() {
            return Err(ValidationError::NoProducts);
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::MissingMessage);
        }
        let mut seen = Vec::with_capacity(self.products.len());
        for (idx, product) in self.products.iter().enumerate() {
            if product.name.trim().is_empty() {
                return Err(ValidationError::UnnamedProduct(idx));
            }
            if seen.contains(&product.name) {
                return Err(ValidationError::DuplicateProduct(product.name.clone()));
            }
            seen.push(product.name.clone());
        }
        parse_hex_color(&self.brand_color)
            .ok_or_else(|| ValidationError::InvalidBrandColor(self.brand_color.clone()))?;
        Ok(())
    }

    /// The message to render for a locale, falling back to the brief default.
    pub fn message_for(&self, locale: &str) -> &str {
        self.localized_messages
            .get(locale)
            .map(String::as_str)
            .unwrap_or(&self.message)
    }

    /// Brand color as RGB. Validation guarantees this parses post-parse.
    pub fn brand_rgb(&self) -> (u8, u8, u8) {
        parse_hex_color(&self.brand_color).unwrap_or((255, 255, 255))
    }
}

/// Parse a `#RRGGBB` hex color string.
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Crop strategy bound to an aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropStrategy {
    /// Plain center crop after cover scaling.
    Center,
    /// Vertical placement biased toward the visual center of interest in the
    /// upper two thirds of the frame (keeps heads in widescreen crops).
    UpperWeighted,
}

/// Output aspect ratios, each with canonical pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    Square,
    Story,
    Wide,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 3] = [AspectRatio::Square, AspectRatio::Story, AspectRatio::Wide];

    /// Canonical output dimensions in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1080, 1080),
            AspectRatio::Story => (1080, 1920),
            AspectRatio::Wide => (1920, 1080),
        }
    }

    /// Filename-safe label, e.g. "16x9".
    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "1x1",
            AspectRatio::Story => "9x16",
            AspectRatio::Wide => "16x9",
        }
    }

    pub fn crop_strategy(self) -> CropStrategy {
        match self {
            AspectRatio::Wide => CropStrategy::UpperWeighted,
            AspectRatio::Square | AspectRatio::Story => CropStrategy::Center,
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief_with(products: Vec<Product>) -> CampaignBrief {
        CampaignBrief {
            region: "Global".into(),
            audience: None,
            message: "Hello".into(),
            brand_color: "#FFFFFF".into(),
            products,
            localized_messages: HashMap::new(),
            logo: None,
        }
    }

    fn product(name: &str) -> Product {
        Product {
            name: name.into(),
            description: String::new(),
            hero_image: None,
        }
    }

    #[test]
    fn test_validate_requires_products() {
        let brief = brief_with(vec![]);
        assert!(matches!(brief.validate(), Err(ValidationError::NoProducts)));
    }

    #[test]
    fn test_validate_requires_message() {
        let mut brief = brief_with(vec![product("A")]);
        brief.message = "  ".into();
        assert!(matches!(
            brief.validate(),
            Err(ValidationError::MissingMessage)
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let brief = brief_with(vec![product("A"), product("A")]);
        assert!(matches!(
            brief.validate(),
            Err(ValidationError::DuplicateProduct(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_brand_color() {
        let mut brief = brief_with(vec![product("A")]);
        brief.brand_color = "blue".into();
        assert!(matches!(
            brief.validate(),
            Err(ValidationError::InvalidBrandColor(_))
        ));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF8800"), Some((255, 136, 0)));
        assert_eq!(parse_hex_color("#ffffff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("FF8800"), None);
        assert_eq!(parse_hex_color("#FFF"), None);
    }

    #[test]
    fn test_message_for_falls_back() {
        let mut brief = brief_with(vec![product("A")]);
        brief
            .localized_messages
            .insert("ja".into(), "こんにちは".into());
        assert_eq!(brief.message_for("ja"), "こんにちは");
        assert_eq!(brief.message_for("fr"), "Hello");
    }

    #[test]
    fn test_aspect_ratio_dimensions() {
        assert_eq!(AspectRatio::Square.dimensions(), (1080, 1080));
        assert_eq!(AspectRatio::Story.dimensions(), (1080, 1920));
        assert_eq!(AspectRatio::Wide.dimensions(), (1920, 1080));
    }

    #[test]
    fn test_wide_uses_upper_weighted_crop() {
        assert_eq!(AspectRatio::Wide.crop_strategy(), CropStrategy::UpperWeighted);
        assert_eq!(AspectRatio::Story.crop_strategy(), CropStrategy::Center);
    }
}
