//! Brief moderation gate.
//!
//! Two classifier backends run over the free-text fields of a brief and
//! either one flagging the text rejects the whole campaign. Backend errors
//! fail open: an unreachable classifier never blocks a run, it only logs.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use adforge_core::error::Violation;
use adforge_core::models::CampaignBrief;

/// Toxicity score above which a field is rejected.
const TOXICITY_THRESHOLD: f64 = 0.7;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of moderating one piece of text.
#[derive(Debug, Clone, Default)]
pub struct Verdict {
    pub flagged: bool,
    /// Classifier categories that fired, e.g. "OpenAI:hate".
    pub categories: Vec<String>,
}

impl Verdict {
    pub fn clean() -> Self {
        Self::default()
    }
}

/// A single moderation backend. Implementations are fail-open: any
/// transport or parse error returns a clean verdict.
#[async_trait]
pub trait ModerationGate: Send + Sync {
    async fn check(&self, text: &str) -> Verdict;
}

/// Gate that flags nothing. Used when no classifier keys are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllGate;

#[async_trait]
impl ModerationGate for AllowAllGate {
    async fn check(&self, _text: &str) -> Verdict {
        Verdict::clean()
    }
}

/// OpenAI moderation endpoint (omni-moderation-latest).
pub struct OpenAiModeration {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Serialize)]
struct OpenAiModerationRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct OpenAiModerationResponse {
    results: Vec<OpenAiModerationResult>,
}

#[derive(Deserialize)]
struct OpenAiModerationResult {
    flagged: bool,
    #[serde(default)]
    categories: BTreeMap<String, bool>,
}

impl OpenAiModeration {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    async fn request(&self, text: &str) -> Result<Verdict, reqwest::Error> {
        let response = self
            .client
            .post("https://api.openai.com/v1/moderations")
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&OpenAiModerationRequest {
                model: "omni-moderation-latest",
                input: text,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<OpenAiModerationResponse>()
            .await?;

        let Some(result) = response.results.into_iter().next() else {
            return Ok(Verdict::clean());
        };
        let categories = result
            .categories
            .into_iter()
            .filter(|(_, fired)| *fired)
            .map(|(cat, _)| format!("OpenAI:{}", cat))
            .collect();
        Ok(Verdict {
            flagged: result.flagged,
            categories,
        })
    }
}

#[async_trait]
impl ModerationGate for OpenAiModeration {
    async fn check(&self, text: &str) -> Verdict {
        match self.request(text).await {
            Ok(verdict) => verdict,
            Err(e) => {
                error!(error = %e, "OpenAI moderation request failed, skipping");
                Verdict::clean()
            }
        }
    }
}

/// Google Perspective API toxicity classifier.
pub struct PerspectiveModeration {
    client: reqwest::Client,
    api_key: String,
}

const PERSPECTIVE_ATTRIBUTES: &[&str] = &[
    "TOXICITY",
    "SEVERE_TOXICITY",
    "IDENTITY_ATTACK",
    "INSULT",
    "PROFANITY",
    "THREAT",
];

#[derive(Deserialize)]
struct PerspectiveResponse {
    #[serde(rename = "attributeScores", default)]
    attribute_scores: BTreeMap<String, PerspectiveAttribute>,
}

#[derive(Deserialize)]
struct PerspectiveAttribute {
    #[serde(rename = "summaryScore")]
    summary_score: PerspectiveScore,
}

#[derive(Deserialize)]
struct PerspectiveScore {
    value: f64,
}

impl PerspectiveModeration {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    async fn request(&self, text: &str) -> Result<Verdict, reqwest::Error> {
        let url = format!(
            "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze?key={}",
            self.api_key
        );
        let attributes: BTreeMap<&str, serde_json::Value> = PERSPECTIVE_ATTRIBUTES
            .iter()
            .map(|attr| (*attr, serde_json::json!({})))
            .collect();
        let body = serde_json::json!({
            "comment": { "text": text },
            "requestedAttributes": attributes,
            "languages": ["en"],
        });

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<PerspectiveResponse>()
            .await?;

        let toxicity = response
            .attribute_scores
            .get("TOXICITY")
            .map(|a| a.summary_score.value)
            .unwrap_or(0.0);
        if toxicity < TOXICITY_THRESHOLD {
            return Ok(Verdict::clean());
        }

        warn!(toxicity, "Perspective flagged text");
        let categories = response
            .attribute_scores
            .into_iter()
            .filter(|(_, attr)| attr.summary_score.value >= TOXICITY_THRESHOLD)
            .map(|(name, _)| format!("Perspective:{}", name.to_lowercase()))
            .collect();
        Ok(Verdict {
            flagged: true,
            categories,
        })
    }
}

#[async_trait]
impl ModerationGate for PerspectiveModeration {
    async fn check(&self, text: &str) -> Verdict {
        match self.request(text).await {
            Ok(verdict) => verdict,
            Err(e) => {
                error!(error = %e, "Perspective request failed, skipping");
                Verdict::clean()
            }
        }
    }
}

/// Runs every configured backend; a flag from any one rejects the text.
#[derive(Default)]
pub struct CompositeGate {
    gates: Vec<Box<dyn ModerationGate>>,
}

impl CompositeGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, gate: impl ModerationGate + 'static) -> Self {
        self.gates.push(Box::new(gate));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

#[async_trait]
impl ModerationGate for CompositeGate {
    async fn check(&self, text: &str) -> Verdict {
        let mut merged = Verdict::clean();
        for gate in &self.gates {
            let verdict = gate.check(text).await;
            merged.flagged |= verdict.flagged;
            merged.categories.extend(verdict.categories);
        }
        merged
    }
}

/// Moderate every free-text field of a brief. Returns one violation per
/// flagged field; an empty vec means the brief passed.
pub async fn moderate_brief(gate: &dyn ModerationGate, brief: &CampaignBrief) -> Vec<Violation> {
    let mut fields: Vec<(String, &str)> = Vec::new();
    if !brief.message.is_empty() {
        fields.push(("Campaign Message".to_string(), brief.message.as_str()));
    }
    for (idx, product) in brief.products.iter().enumerate() {
        if !product.name.is_empty() {
            fields.push((format!("Product {} Name", idx + 1), product.name.as_str()));
        }
        if !product.description.is_empty() {
            fields.push((
                format!("Product {} Description", idx + 1),
                product.description.as_str(),
            ));
        }
    }
    if let Some(audience) = brief.audience.as_deref().filter(|a| !a.is_empty()) {
        fields.push(("Target Audience".to_string(), audience));
    }

    let mut violations = Vec::new();
    for (field, content) in fields {
        let verdict = gate.check(content).await;
        if verdict.flagged {
            let categories = if verdict.categories.is_empty() {
                vec!["inappropriate_content".to_string()]
            } else {
                verdict.categories
            };
            warn!(field = %field, categories = ?categories, "moderation violation");
            violations.push(Violation {
                field,
                content: content.to_string(),
                categories,
            });
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use adforge_core::models::Product;

    struct BanWord(&'static str);

    #[async_trait]
    impl ModerationGate for BanWord {
        async fn check(&self, text: &str) -> Verdict {
            if text.contains(self.0) {
                Verdict {
                    flagged: true,
                    categories: vec![format!("test:{}", self.0)],
                }
            } else {
                Verdict::clean()
            }
        }
    }

    fn brief_with(message: &str, product_desc: &str) -> CampaignBrief {
        CampaignBrief {
            region: "Global".to_string(),
            audience: Some("everyone".to_string()),
            message: message.to_string(),
            brand_color: "#FFFFFF".to_string(),
            products: vec![Product {
                name: "Widget".to_string(),
                description: product_desc.to_string(),
                hero_image: None,
            }],
            localized_messages: Default::default(),
            logo: None,
        }
    }

    #[tokio::test]
    async fn test_clean_brief_passes() {
        let brief = brief_with("hello", "a nice widget");
        let violations = moderate_brief(&BanWord("zzz"), &brief).await;
        assert!(violations.is_empty());
    }

    #[tokio::test]
    async fn test_flagged_fields_reported_with_labels() {
        let brief = brief_with("bad message", "bad description");
        let violations = moderate_brief(&BanWord("bad"), &brief).await;
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["Campaign Message", "Product 1 Description"]);
        assert_eq!(violations[0].categories, vec!["test:bad"]);
    }

    #[tokio::test]
    async fn test_composite_any_gate_rejects() {
        let gate = CompositeGate::new().push(BanWord("aaa")).push(BanWord("bbb"));
        let verdict = gate.check("contains bbb only").await;
        assert!(verdict.flagged);
        assert_eq!(verdict.categories, vec!["test:bbb"]);
    }

    #[tokio::test]
    async fn test_allow_all_gate() {
        let verdict = AllowAllGate.check("anything at all").await;
        assert!(!verdict.flagged);
    }

    #[tokio::test]
    async fn test_empty_categories_get_fallback_label() {
        struct FlagNoCats;
        #[async_trait]
        impl ModerationGate for FlagNoCats {
            async fn check(&self, _text: &str) -> Verdict {
                Verdict {
                    flagged: true,
                    categories: vec![],
                }
            }
        }
        let brief = brief_with("anything", "");
        let violations = moderate_brief(&FlagNoCats, &brief).await;
        assert_eq!(violations[0].categories, vec!["inappropriate_content"]);
    }
}
