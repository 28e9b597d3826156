//! Catalog of passphrases a user may be asked to speak.

use serde::{Deserialize, Serialize};

use crate::error::PassphraseError;
use crate::text::{normalize, text_similarity};

/// Phrases offered when no catalog is configured.
pub const DEFAULT_PHRASES: [&str; 5] = [
    "صوتي هو كلمة مروري",
    "أنا صاحب هذا الحساب",
    "تحقق من هويتي الصوتية",
    "هذا صوتي الحقيقي",
    "أريد الدخول إلى حسابي",
];

/// The set of passphrases a user may be asked to speak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassphraseCatalog {
    phrases: Vec<String>,
}

impl PassphraseCatalog {
    pub fn new(phrases: Vec<String>) -> Result<Self, PassphraseError> {
        if phrases.is_empty() {
            return Err(PassphraseError::EmptyCatalog);
        }
        Ok(Self { phrases })
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Picks a phrase uniformly from the OS random source.
    pub fn random(&self) -> Result<&str, PassphraseError> {
        if self.phrases.is_empty() {
            return Err(PassphraseError::EmptyCatalog);
        }
        let mut buf = [0u8; 8];
        getrandom::fill(&mut buf).map_err(|e| PassphraseError::Random(e.to_string()))?;
        let idx = (u64::from_le_bytes(buf) % self.phrases.len() as u64) as usize;
        Ok(&self.phrases[idx])
    }

    /// Reports whether `text` is at least `threshold` similar to any phrase.
    pub fn is_accepted(&self, text: &str, threshold: f64) -> bool {
        let text = normalize(text);
        !text.is_empty()
            && self
                .phrases
                .iter()
                .any(|p| text_similarity(&text, &normalize(p)) >= threshold)
    }
}

impl Default for PassphraseCatalog {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = PassphraseCatalog::default();
        assert_eq!(catalog.phrases().len(), 5);
        for phrase in DEFAULT_PHRASES {
            assert!(catalog.is_accepted(phrase, 0.7));
        }
    }

    #[test]
    fn test_is_accepted_uses_similarity() {
        let catalog = PassphraseCatalog::default();
        assert!(catalog.is_accepted("  هذا صوتي الحقيقي؟ ", 0.7));
        // Two of three words: 0.7 * 0.8 + 0.3 * 0.5.
        assert!(catalog.is_accepted("هذا صوتي", 0.7));
        assert!(!catalog.is_accepted("هذا صوتي", 0.9));
        assert!(!catalog.is_accepted("كلمة عشوائية", 0.7));
        assert!(!catalog.is_accepted("", 0.0));
    }

    #[test]
    fn test_random_is_member() {
        let catalog = PassphraseCatalog::default();
        for _ in 0..50 {
            let phrase = catalog.random().unwrap();
            assert!(catalog.phrases().iter().any(|p| p == phrase));
        }
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(
            PassphraseCatalog::new(Vec::new()),
            Err(PassphraseError::EmptyCatalog)
        ));
        let one = PassphraseCatalog::new(vec!["open sesame".into()]).unwrap();
        assert_eq!(one.random().unwrap(), "open sesame");
    }

    #[test]
    fn test_serde_as_list() {
        let catalog = PassphraseCatalog::new(vec!["a b".into(), "c".into()]).unwrap();
        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(json, r#"["a b","c"]"#);
        let back: PassphraseCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
    }
}
