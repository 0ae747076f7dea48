//! Script classification for font selection.
//!
//! Maps a message to a writing-system tag by inspecting code points.
//! Mixed-script precedence is deterministic: the first code point that
//! classifies as a non-Latin script decides the tag; text with no such
//! code point is Latin.

/// Writing-system tag resolved from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Thai,
    /// Arabic, Persian, Urdu.
    Arabic,
    Hebrew,
    Bengali,
    Greek,
    Devanagari,
    Ethiopic,
    /// Korean.
    Hangul,
    /// Bopomofo and compatibility ideographs.
    HanTraditional,
    /// CJK unified ideographs plus Japanese kana.
    HanSimplified,
    Cyrillic,
    Latin,
}

impl Script {
    /// Classify one character, or None for characters that carry no script
    /// signal (ASCII, punctuation, digits).
    fn of_char(c: char) -> Option<Script> {
        let code = c as u32;
        let script = match code {
            0x0E00..=0x0E7F => Script::Thai,
            0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF => Script::Arabic,
            0xFB50..=0xFDFF | 0xFE70..=0xFEFF => Script::Arabic,
            0x0590..=0x05FF => Script::Hebrew,
            0x0980..=0x09FF => Script::Bengali,
            0x0370..=0x03FF | 0x1F00..=0x1FFF => Script::Greek,
            0x0900..=0x097F => Script::Devanagari,
            0x1200..=0x137F => Script::Ethiopic,
            0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F => Script::Hangul,
            0x3100..=0x312F | 0xF900..=0xFAFF => Script::HanTraditional,
            // Unified ideographs, extension A, hiragana, katakana
            // (incl. halfwidth).
            0x4E00..=0x9FFF | 0x3400..=0x4DBF => Script::HanSimplified,
            0x3040..=0x309F | 0x30A0..=0x30FF | 0xFF65..=0xFF9F => Script::HanSimplified,
            0x0400..=0x04FF | 0x0500..=0x052F => Script::Cyrillic,
            0x0041..=0x024F => Script::Latin,
            _ => return None,
        };
        Some(script)
    }

    /// Classify a message. First non-Latin hit wins; all-Latin or
    /// unclassifiable text is Latin.
    pub fn classify(text: &str) -> Script {
        for c in text.chars() {
            match Script::of_char(c) {
                Some(Script::Latin) | None => continue,
                Some(script) => return script,
            }
        }
        Script::Latin
    }

    /// Whether words are delimited by spaces. Scripts without word spacing
    /// wrap per character instead of per word.
    pub fn word_delimited(self) -> bool {
        !matches!(
            self,
            Script::Thai | Script::HanSimplified | Script::HanTraditional
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hangul_only_message() {
        assert_eq!(Script::classify("옷이 날개다"), Script::Hangul);
    }

    #[test]
    fn test_latin_default() {
        assert_eq!(Script::classify("Clothes that make the man"), Script::Latin);
        assert_eq!(Script::classify("1234 !?"), Script::Latin);
        assert_eq!(Script::classify(""), Script::Latin);
    }

    #[test]
    fn test_mixed_latin_arabic_is_arabic() {
        // Precedence: first non-Latin code point decides.
        assert_eq!(Script::classify("Sale! تخفيضات"), Script::Arabic);
        assert_eq!(Script::classify("تخفيضات Sale!"), Script::Arabic);
    }

    #[test]
    fn test_mixed_two_non_latin_scripts_first_wins() {
        assert_eq!(Script::classify("日本 한국"), Script::HanSimplified);
        assert_eq!(Script::classify("한국 日本"), Script::Hangul);
    }

    #[test]
    fn test_individual_scripts() {
        assert_eq!(Script::classify("สวัสดี"), Script::Thai);
        assert_eq!(Script::classify("שלום"), Script::Hebrew);
        assert_eq!(Script::classify("নমস্কার"), Script::Bengali);
        assert_eq!(Script::classify("Γειά σου"), Script::Greek);
        assert_eq!(Script::classify("नमस्ते"), Script::Devanagari);
        assert_eq!(Script::classify("ሰላም"), Script::Ethiopic);
        assert_eq!(Script::classify("Привет"), Script::Cyrillic);
        assert_eq!(Script::classify("こんにちは"), Script::HanSimplified);
        assert_eq!(Script::classify("服が人をつくる"), Script::HanSimplified);
    }

    #[test]
    fn test_word_wrapping_mode() {
        assert!(Script::Latin.word_delimited());
        assert!(Script::Hangul.word_delimited());
        assert!(!Script::Thai.word_delimited());
        assert!(!Script::HanSimplified.word_delimited());
    }
}
