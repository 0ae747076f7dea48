//! Hero image resolution.
//!
//! Resolution order for each product: per-run cache, the brief's explicit
//! `hero_image` reference (local path, then remote key), a conventional
//! local asset (`{product}_hero.{ext}` or `{product}.{ext}` under the
//! assets dir), and finally the provider chain. Never fails: the chain
//! bottoms out in a placeholder.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use adforge_core::models::{AssetKind, CampaignBrief, GeneratedAsset, Product, Provenance};
use adforge_core::names::normalize_name;
use adforge_providers::ProviderChain;
use adforge_storage::RemoteStore;

const HERO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

pub struct HeroResolver {
    chain: ProviderChain,
    assets_dir: PathBuf,
    remote: Option<Arc<dyn RemoteStore>>,
    /// Per-run cache keyed by normalized product name, so a product appearing
    /// in several units resolves its hero exactly once.
    cache: Mutex<HashMap<String, GeneratedAsset>>,
}

impl HeroResolver {
    pub fn new(
        chain: ProviderChain,
        assets_dir: impl Into<PathBuf>,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> Self {
        Self {
            chain,
            assets_dir: assets_dir.into(),
            remote,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the hero image for a product. Always yields an asset.
    pub async fn resolve(&self, product: &Product, brief: &CampaignBrief) -> GeneratedAsset {
        let cache_key = normalize_name(&product.name);
        if let Some(asset) = self.cache.lock().await.get(&cache_key) {
            return asset.clone();
        }

        let asset = self.resolve_uncached(product, brief).await;
        self.cache
            .lock()
            .await
            .insert(cache_key, asset.clone());
        asset
    }

    async fn resolve_uncached(&self, product: &Product, brief: &CampaignBrief) -> GeneratedAsset {
        if let Some(reference) = &product.hero_image {
            if let Some(asset) = self.load_reference(reference).await {
                return asset;
            }
            warn!(
                product = %product.name,
                reference = %reference,
                "hero reference unretrievable, falling back to generation"
            );
        }

        if let Some(asset) = self.find_local_asset(&product.name).await {
            return asset;
        }

        let prompt = build_prompt(product, &brief.region);
        info!(product = %product.name, "generating hero image");
        self.chain.generate(&prompt).await
    }

    /// Load an explicit hero reference: a filesystem path (absolute or
    /// relative to the assets dir), else a remote store key.
    async fn load_reference(&self, reference: &str) -> Option<GeneratedAsset> {
        let path = Path::new(reference);
        let candidates = if path.is_absolute() {
            vec![path.to_path_buf()]
        } else {
            vec![path.to_path_buf(), self.assets_dir.join(reference)]
        };
        for candidate in candidates {
            if let Ok(bytes) = tokio::fs::read(&candidate).await {
                info!(path = %candidate.display(), "hero loaded from local file");
                return Some(GeneratedAsset::new(
                    AssetKind::UserUploaded,
                    bytes,
                    Provenance::user_upload(reference),
                ));
            }
        }

        if let Some(remote) = &self.remote {
            match remote.download(reference).await {
                Ok(bytes) => {
                    info!(key = %reference, "hero downloaded from remote store");
                    return Some(GeneratedAsset::new(
                        AssetKind::UserUploaded,
                        bytes,
                        Provenance::user_upload(reference),
                    ));
                }
                Err(e) => {
                    warn!(key = %reference, error = %e, "remote hero download failed");
                }
            }
        }
        None
    }

    /// Conventional per-product asset in the assets dir.
    async fn find_local_asset(&self, product_name: &str) -> Option<GeneratedAsset> {
        let stem = normalize_name(product_name);
        for name in [format!("{stem}_hero"), stem] {
            for ext in HERO_EXTENSIONS {
                let path = self.assets_dir.join(format!("{name}.{ext}"));
                if let Ok(bytes) = tokio::fs::read(&path).await {
                    info!(path = %path.display(), "hero found in assets dir");
                    let reference = format!("{name}.{ext}");
                    return Some(GeneratedAsset::new(
                        AssetKind::UserUploaded,
                        bytes,
                        Provenance::user_upload(&reference),
                    ));
                }
            }
        }
        None
    }
}

/// Generation prompt for a product in a regional campaign.
pub fn build_prompt(product: &Product, region: &str) -> String {
    let mut prompt = format!("Professional product photography of {}", product.name);
    if !product.description.is_empty() {
        prompt.push_str(", ");
        prompt.push_str(&product.description);
    }
    prompt.push_str(", high quality, commercial advertising style, clean background");
    if !region.is_empty() && region != "Global" {
        prompt.push_str(&format!(", targeting {region} market"));
        if let Some(context) = region_visual_context(region) {
            prompt.push_str(", ");
            prompt.push_str(context);
        }
    }
    prompt
}

/// Culturally distinct background hint per region, biasing generated heroes
/// toward locally recognizable settings.
fn region_visual_context(region: &str) -> Option<&'static str> {
    match region {
        "Japan" => Some("with subtle minimalist Japanese aesthetic"),
        "France" => Some("with elegant Parisian styling"),
        "Spain" => Some("with warm Mediterranean tones"),
        "Germany" => Some("with clean modern European design"),
        "China" => Some("with refined contemporary Chinese styling"),
        "South Korea" => Some("with sleek Seoul-inspired styling"),
        "Italy" => Some("with classic Italian craftsmanship cues"),
        "Brazil" => Some("with vibrant tropical accents"),
        "Russia" => Some("with cool northern-light tones"),
        "Ethiopia" => Some("with rich earthy highland tones"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adforge_storage::InMemoryStore;

    fn product(name: &str, hero_image: Option<&str>) -> Product {
        Product {
            name: name.to_string(),
            description: "a fine product".to_string(),
            hero_image: hero_image.map(String::from),
        }
    }

    fn brief(region: &str) -> CampaignBrief {
        CampaignBrief {
            region: region.to_string(),
            audience: None,
            message: "msg".to_string(),
            brand_color: "#FFFFFF".to_string(),
            products: vec![],
            localized_messages: Default::default(),
            logo: None,
        }
    }

    fn empty_chain() -> ProviderChain {
        ProviderChain::new(vec![])
    }

    #[test]
    fn test_build_prompt_includes_region() {
        let p = product("Silk Scarf", None);
        let prompt = build_prompt(&p, "Japan");
        assert_eq!(
            prompt,
            "Professional product photography of Silk Scarf, a fine product, \
             high quality, commercial advertising style, clean background, \
             targeting Japan market, with subtle minimalist Japanese aesthetic"
        );
    }

    #[test]
    fn test_build_prompt_unknown_region_has_no_visual_context() {
        let p = product("Silk Scarf", None);
        let prompt = build_prompt(&p, "Atlantis");
        assert!(prompt.ends_with("targeting Atlantis market"));
    }

    #[test]
    fn test_build_prompt_global_omits_market() {
        let p = product("Silk Scarf", None);
        assert!(!build_prompt(&p, "Global").contains("market"));
    }

    #[tokio::test]
    async fn test_explicit_reference_from_assets_dir() {
        let tmp = tempfile::tempdir().unwrap();
        tokio::fs::write(tmp.path().join("scarf.png"), b"scarf-bytes")
            .await
            .unwrap();
        let resolver = HeroResolver::new(empty_chain(), tmp.path(), None);
        let asset = resolver
            .resolve(&product("Scarf", Some("scarf.png")), &brief("Global"))
            .await;
        assert_eq!(asset.kind, AssetKind::UserUploaded);
        assert_eq!(&asset.bytes[..], b"scarf-bytes");
        assert_eq!(asset.provenance.source, "user-upload:scarf.png");
    }

    #[tokio::test]
    async fn test_explicit_reference_from_remote_store() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryStore::new());
        store.seed("uploads/scarf.png", b"remote-bytes".to_vec());
        let resolver = HeroResolver::new(empty_chain(), tmp.path(), Some(store));
        let asset = resolver
            .resolve(
                &product("Scarf", Some("uploads/scarf.png")),
                &brief("Global"),
            )
            .await;
        assert_eq!(asset.kind, AssetKind::UserUploaded);
        assert_eq!(&asset.bytes[..], b"remote-bytes");
    }

    #[tokio::test]
    async fn test_conventional_local_asset_found() {
        let tmp = tempfile::tempdir().unwrap();
        tokio::fs::write(tmp.path().join("silk_scarf_hero.jpg"), b"hero")
            .await
            .unwrap();
        let resolver = HeroResolver::new(empty_chain(), tmp.path(), None);
        let asset = resolver
            .resolve(&product("Silk Scarf", None), &brief("Global"))
            .await;
        assert_eq!(asset.kind, AssetKind::UserUploaded);
        assert_eq!(&asset.bytes[..], b"hero");
    }

    #[tokio::test]
    async fn test_unretrievable_reference_falls_back_to_generation() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = HeroResolver::new(empty_chain(), tmp.path(), None);
        let asset = resolver
            .resolve(&product("Scarf", Some("missing.png")), &brief("Global"))
            .await;
        // Empty chain bottoms out in a placeholder.
        assert_eq!(asset.kind, AssetKind::Placeholder);
    }

    #[tokio::test]
    async fn test_resolution_is_cached_per_product() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scarf.png");
        tokio::fs::write(&path, b"v1").await.unwrap();
        let resolver = HeroResolver::new(empty_chain(), tmp.path(), None);
        let p = product("Scarf", Some("scarf.png"));
        let first = resolver.resolve(&p, &brief("Global")).await;
        // Mutating the file must not affect subsequent resolutions.
        tokio::fs::write(&path, b"v2").await.unwrap();
        let second = resolver.resolve(&p, &brief("Global")).await;
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(&second.bytes[..], b"v1");
    }
}
