//! Regional localization of campaign messages.
//!
//! Translation never fails a run: an unknown region or message falls back
//! to the original English text.

use async_trait::async_trait;
use tracing::info;

/// Localizes a campaign message for a target region. Implementations
/// return the original text when no localization is available.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, message: &str, region: &str) -> String;
}

const CLOTHES: &str = "Clothes that make the man";
const GLOW: &str = "Experience the pure, natural glow. Your skin deserves it";

/// Exact-match lookups per region for stock campaign taglines.
static LEXICON: &[(&str, &[(&str, &str)])] = &[
    (
        "Japan",
        &[
            (CLOTHES, "服が人をつくる"),
            (GLOW, "純粋で自然な輝きを体験してください。あなたの肌はそれに値します"),
        ],
    ),
    (
        "France",
        &[
            (CLOTHES, "L'habit fait le moine"),
            (GLOW, "Découvrez l'éclat pur et naturel. Votre peau le mérite"),
        ],
    ),
    (
        "Spain",
        &[
            (CLOTHES, "El hábito hace al monje"),
            (GLOW, "Experimenta el brillo puro y natural. Tu piel lo merece"),
        ],
    ),
    (
        "Germany",
        &[
            (CLOTHES, "Kleider machen Leute"),
            (GLOW, "Erleben Sie den reinen, natürlichen Glanz. Ihre Haut verdient es"),
        ],
    ),
    (
        "China",
        &[
            (CLOTHES, "人靠衣装"),
            (GLOW, "体验纯净自然的光泽。你的皮肤值得拥有"),
        ],
    ),
    (
        "South Korea",
        &[
            (CLOTHES, "옷이 날개다"),
            (GLOW, "순수하고 자연스러운 빛을 경험하세요. 당신의 피부는 그럴 자격이 있습니다"),
        ],
    ),
    (
        "Italy",
        &[
            (CLOTHES, "L'abito fa il monaco"),
            (GLOW, "Prova la luminosità pura e naturale. La tua pelle lo merita"),
        ],
    ),
    (
        "Brazil",
        &[
            (CLOTHES, "As roupas fazem o homem"),
            (GLOW, "Experimente o brilho puro e natural. Sua pele merece"),
        ],
    ),
    (
        "Russia",
        &[
            (CLOTHES, "Встречают по одёжке"),
            (GLOW, "Почувствуйте чистое, естественное сияние. Ваша кожа этого заслуживает"),
        ],
    ),
    (
        "Ethiopia",
        &[
            (CLOTHES, "ልብስ ሰውን ያደርጋል"),
            (GLOW, "ንጹህ እና ተፈጥሯዊ ብሩህነትን ይለማመዱ። ቆዳዎ ይገባዋል"),
        ],
    ),
];

/// Built-in translator backed by a static per-region lexicon.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegionalLexicon;

impl RegionalLexicon {
    pub fn supported_regions() -> Vec<&'static str> {
        LEXICON.iter().map(|(region, _)| *region).collect()
    }
}

#[async_trait]
impl Translator for RegionalLexicon {
    async fn translate(&self, message: &str, region: &str) -> String {
        let region = region.trim();
        if let Some((_, entries)) = LEXICON.iter().find(|(r, _)| *r == region) {
            if let Some((_, localized)) = entries.iter().find(|(m, _)| *m == message) {
                info!(region, localized, "localized campaign message");
                return (*localized).to_string();
            }
        }
        info!(region, "no localization available, keeping original message");
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_region_and_message() {
        let out = RegionalLexicon
            .translate("Clothes that make the man", "Japan")
            .await;
        assert_eq!(out, "服が人をつくる");
    }

    #[tokio::test]
    async fn test_region_is_trimmed() {
        let out = RegionalLexicon
            .translate("Clothes that make the man", "  Germany ")
            .await;
        assert_eq!(out, "Kleider machen Leute");
    }

    #[tokio::test]
    async fn test_unknown_message_passes_through() {
        let out = RegionalLexicon.translate("Buy now", "Japan").await;
        assert_eq!(out, "Buy now");
    }

    #[tokio::test]
    async fn test_unknown_region_passes_through() {
        let out = RegionalLexicon
            .translate("Clothes that make the man", "Atlantis")
            .await;
        assert_eq!(out, "Clothes that make the man");
    }

    #[test]
    fn test_supported_regions() {
        let regions = RegionalLexicon::supported_regions();
        assert_eq!(regions.len(), 10);
        assert!(regions.contains(&"South Korea"));
    }
}
