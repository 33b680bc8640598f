//! Locale-aware spell checking.
//!
//! A [`SpellCheckResolver`] composes, for a locale, the dictionaries of the
//! locale and each of its ancestors, plus the root dictionaries when at least
//! one locale-specific dictionary exists. Resolution happens once per locale.

pub mod dictionary;

use std::{path::Path, sync::Arc};

use dashmap::DashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::{error::Error, locale::Locale};

pub use dictionary::{Dictionary, DictionaryRegistry, WordList, edit_distance};

/// One word not found in any dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misspelling {
    pub word: String,
    /// Byte offset of the word in the checked text.
    pub offset: usize,
    pub suggestion: Option<String>,
}

/// The dictionaries applicable to one locale.
#[derive(Debug, Clone)]
pub struct SpellChecker {
    dictionaries: Vec<Arc<dyn Dictionary>>,
}

impl SpellChecker {
    pub fn new(dictionaries: Vec<Arc<dyn Dictionary>>) -> Self {
        SpellChecker { dictionaries }
    }

    pub fn dictionaries(&self) -> &[Arc<dyn Dictionary>] {
        &self.dictionaries
    }

    pub fn is_correct(&self, word: &str) -> bool {
        self.dictionaries.iter().any(|d| d.contains(word))
    }

    /// Best suggestion over all dictionaries, closest first, then lexicographic.
    pub fn suggest(&self, word: &str) -> Option<String> {
        self.dictionaries
            .iter()
            .filter_map(|d| d.suggest(word))
            .min_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)))
            .map(|(w, _)| w)
    }

    /// Tokenizes `text` on Unicode word boundaries and returns every unknown
    /// word. Tokens without letters or with digits are not words.
    pub fn check(&self, text: &str) -> Vec<Misspelling> {
        text.split_word_bound_indices()
            .filter(|(_, token)| is_checkable(token))
            .filter(|(_, token)| !self.is_correct(token))
            .map(|(offset, token)| Misspelling {
                word: token.to_string(),
                offset,
                suggestion: self.suggest(token),
            })
            .collect()
    }
}

fn is_checkable(token: &str) -> bool {
    token.chars().any(char::is_alphabetic) && !token.chars().any(|c| c.is_numeric())
}

/// Applies every suggestion to `text`. Replacements run from the last offset
/// to the first so earlier offsets stay valid.
pub fn apply_corrections(text: &str, misspellings: &[Misspelling]) -> String {
    let mut ordered: Vec<&Misspelling> = misspellings.iter().collect();
    ordered.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut corrected = text.to_string();
    for misspelling in ordered {
        let Some(suggestion) = &misspelling.suggestion else {
            continue;
        };
        let end = misspelling.offset + misspelling.word.len();
        if corrected.get(misspelling.offset..end) == Some(misspelling.word.as_str()) {
            corrected.replace_range(misspelling.offset..end, suggestion);
        }
    }
    corrected
}

/// Resolves and caches one [`SpellChecker`] per locale.
#[derive(Debug, Default)]
pub struct SpellCheckResolver {
    registry: DictionaryRegistry,
    cache: DashMap<Locale, Option<Arc<SpellChecker>>>,
}

impl SpellCheckResolver {
    pub fn new(registry: DictionaryRegistry) -> Self {
        SpellCheckResolver {
            registry,
            cache: DashMap::new(),
        }
    }

    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        Ok(Self::new(DictionaryRegistry::load_dir(dir)?))
    }

    /// The checker for `locale`, or `None` when no dictionary applies.
    pub fn checker_for(&self, locale: &Locale) -> Option<Arc<SpellChecker>> {
        if let Some(cached) = self.cache.get(locale) {
            return cached.clone();
        }
        // The entry lock makes concurrent callers wait for a single resolution
        self.cache
            .entry(locale.clone())
            .or_insert_with(|| self.resolve(locale))
            .clone()
    }

    fn resolve(&self, locale: &Locale) -> Option<Arc<SpellChecker>> {
        let mut dictionaries: Vec<Arc<dyn Dictionary>> = locale
            .hierarchy()
            .iter()
            .flat_map(|l| self.registry.for_locale(l).iter().cloned())
            .collect();
        if dictionaries.is_empty() {
            tracing::warn!(locale = %locale, "no dictionary for locale, spell-check skipped");
            return None;
        }
        dictionaries.extend(self.registry.root().iter().cloned());
        tracing::debug!(
            locale = %locale,
            dictionaries = dictionaries.len(),
            "resolved spell checker"
        );
        Some(Arc::new(SpellChecker::new(dictionaries)))
    }

    /// Number of locales resolved so far.
    pub fn resolved_locales(&self) -> usize {
        self.cache.len()
    }
}
