//! Font catalog: resolves a script tag to a loaded font.
//!
//! Fonts live as .ttf/.otf files in a configurable directory. Lookups are
//! cached for the life of the catalog. A missing script font substitutes the
//! Latin default with a warning; a missing Latin default yields None and the
//! overlay degrades to a band without glyphs (it never fails outright).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use ab_glyph::FontArc;
use tracing::warn;

use crate::script::Script;

/// File-name stems tried for a script, in order.
fn candidates(script: Script) -> &'static [&'static str] {
    match script {
        Script::Thai => &["NotoSansThai"],
        Script::Arabic => &["NotoSansArabic", "NotoNaskhArabic"],
        Script::Hebrew => &["NotoSansHebrew"],
        Script::Bengali => &["NotoSansBengali"],
        Script::Greek => &["NotoSans-Regular", "NotoSans", "DejaVuSans"],
        Script::Devanagari => &["NotoSansDevanagari"],
        Script::Ethiopic => &["NotoSansEthiopic"],
        Script::Hangul => &["NotoSansKR"],
        Script::HanTraditional => &["NotoSansTC"],
        Script::HanSimplified => &["NotoSansJP", "NotoSansSC"],
        Script::Cyrillic => &["NotoSans-Regular", "NotoSans", "DejaVuSans"],
        Script::Latin => &["NotoSans-Regular", "NotoSans", "DejaVuSans", "DejaVuSans-Bold"],
    }
}

pub struct FontCatalog {
    fonts_dir: PathBuf,
    cache: Mutex<HashMap<Script, Option<FontArc>>>,
}

impl FontCatalog {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a script to a font, substituting the Latin default when the
    /// script's own font is unavailable.
    pub fn resolve(&self, script: Script) -> Option<FontArc> {
        if let Some(font) = self.cached(script) {
            return font;
        }
        let loaded = self.load(script);
        if loaded.is_none() && script != Script::Latin {
            warn!(
                script = ?script,
                fonts_dir = %self.fonts_dir.display(),
                "No font available for script, substituting Latin default"
            );
            let fallback = self.resolve(Script::Latin);
            self.cache
                .lock()
                .unwrap()
                .insert(script, fallback.clone());
            return fallback;
        }
        self.cache
            .lock()
            .unwrap()
            .insert(script, loaded.clone());
        loaded
    }

    fn cached(&self, script: Script) -> Option<Option<FontArc>> {
        self.cache.lock().unwrap().get(&script).cloned()
    }

    fn load(&self, script: Script) -> Option<FontArc> {
        for stem in candidates(script) {
            for ext in ["ttf", "otf"] {
                let path = self.fonts_dir.join(format!("{stem}.{ext}"));
                let Ok(data) = std::fs::read(&path) else {
                    continue;
                };
                match FontArc::try_from_vec(data) {
                    Ok(font) => {
                        tracing::debug!(
                            script = ?script,
                            path = %path.display(),
                            "Loaded font"
                        );
                        return Some(font);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Unreadable font file, skipping");
                    }
                }
            }
        }
        None
    }
}
