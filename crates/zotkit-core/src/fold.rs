//! ASCII folding for the transliterated search table
//!
//! The folded index stores lossily transliterated text so that an
//! ASCII-only query like "munchen" can match "München". Folding is NFKD
//! decomposition followed by dropping everything outside ASCII, which
//! removes combining marks and any character with no ASCII decomposition.

use unicode_normalization::UnicodeNormalization;

/// Transliterate `text` to its ASCII skeleton.
pub fn ascii_fold(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect()
}

/// True when `text` can be searched against the folded table as-is.
pub fn is_pure_ascii(text: &str) -> bool {
    text.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(ascii_fold("café"), "cafe");
        assert_eq!(ascii_fold("München"), "Munchen");
        assert_eq!(ascii_fold("Škoda"), "Skoda");
    }

    #[test]
    fn test_fold_leaves_ascii_untouched() {
        assert_eq!(ascii_fold("plain text 123"), "plain text 123");
    }

    #[test]
    fn test_fold_drops_undecomposable_characters() {
        // No ASCII decomposition exists for CJK; the fold is lossy.
        assert_eq!(ascii_fold("東京 tokyo"), " tokyo");
    }

    #[test]
    fn test_is_pure_ascii() {
        assert!(is_pure_ascii("epist"));
        assert!(!is_pure_ascii("épist"));
    }
}
