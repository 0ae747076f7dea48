//! Campaign brief parsing: JSON or YAML into a validated `CampaignBrief`.

use std::path::Path;

use adforge_core::error::ValidationError;
use adforge_core::models::CampaignBrief;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefFormat {
    Json,
    Yaml,
}

impl BriefFormat {
    fn from_extension(path: &Path) -> Result<Self, ValidationError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(BriefFormat::Json),
            Some("yaml") | Some("yml") => Ok(BriefFormat::Yaml),
            other => Err(ValidationError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Parse and validate a brief from raw text.
pub fn parse_brief(data: &str, format: BriefFormat) -> Result<CampaignBrief, ValidationError> {
    let brief: CampaignBrief = match format {
        BriefFormat::Json => {
            serde_json::from_str(data).map_err(|e| ValidationError::Malformed(e.to_string()))?
        }
        BriefFormat::Yaml => {
            serde_yaml::from_str(data).map_err(|e| ValidationError::Malformed(e.to_string()))?
        }
    };
    brief.validate()?;
    Ok(brief)
}

/// Parse and validate a brief file; the extension selects the format.
pub fn parse_brief_file(path: &Path) -> Result<CampaignBrief, ValidationError> {
    let format = BriefFormat::from_extension(path)?;
    let data = std::fs::read_to_string(path).map_err(|e| {
        ValidationError::Malformed(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse_brief(&data, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_brief() {
        let brief = parse_brief(
            r#"{
                "region": "Japan",
                "message": "Clothes that make the man",
                "products": [
                    {"name": "Product A", "description": "desc"},
                    {"name": "Product B", "description": "desc"}
                ]
            }"#,
            BriefFormat::Json,
        )
        .unwrap();
        assert_eq!(brief.region, "Japan");
        assert_eq!(brief.products.len(), 2);
        assert_eq!(brief.brand_color, "#FFFFFF");
    }

    #[test]
    fn test_parse_yaml_brief() {
        let brief = parse_brief(
            concat!(
                "region: France\n",
                "message: Bonjour\n",
                "brand_color: \"#102030\"\n",
                "products:\n",
                "  - name: Scarf\n",
                "    hero_image: assets/scarf.png\n",
            ),
            BriefFormat::Yaml,
        )
        .unwrap();
        assert_eq!(brief.brand_rgb(), (0x10, 0x20, 0x30));
        assert_eq!(brief.products[0].hero_image.as_deref(), Some("assets/scarf.png"));
    }

    #[test]
    fn test_missing_products_is_validation_error() {
        let err = parse_brief(r#"{"message": "x", "products": []}"#, BriefFormat::Json)
            .unwrap_err();
        assert!(matches!(err, ValidationError::NoProducts));
    }

    #[test]
    fn test_malformed_json_is_validation_error() {
        let err = parse_brief("{not json", BriefFormat::Json).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = parse_brief_file(Path::new("brief.toml")).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedFormat(_)));
    }
}
