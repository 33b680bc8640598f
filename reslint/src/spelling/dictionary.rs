//! Word-list dictionaries and their registration by locale.

use std::{
    collections::{BTreeMap, HashSet},
    fmt::Debug,
    fs,
    path::Path,
    sync::Arc,
};

use crate::{
    error::Error,
    locale::{Locale, split_bundle_name},
};

/// Largest edit distance at which a dictionary word is offered as a suggestion.
pub const MAX_SUGGESTION_DISTANCE: usize = 2;

const DICTIONARY_EXTENSIONS: [&str; 2] = ["dic", "txt"];

/// A source of known words.
pub trait Dictionary: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Whether `word` is spelled correctly.
    fn contains(&self, word: &str) -> bool;

    /// The closest known word and its edit distance, if one is close enough.
    fn suggest(&self, word: &str) -> Option<(String, usize)>;
}

/// A plain list of words, one per line.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    name: String,
    words: HashSet<String>,
    sorted: Vec<String>,
}

impl WordList {
    /// Parses a word list. Blank lines and `#` comments are ignored.
    pub fn parse(name: impl Into<String>, content: &str) -> Self {
        let words: HashSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        let mut sorted: Vec<String> = words.iter().cloned().collect();
        sorted.sort();
        WordList {
            name: name.into(),
            words,
            sorted,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Dictionary(format!("cannot read {}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::parse(name, &content))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains(&self, word: &str) -> bool {
        self.words.contains(word) || self.words.contains(&word.to_lowercase())
    }

    fn suggest(&self, word: &str) -> Option<(String, usize)> {
        let length = word.chars().count();
        let mut best: Option<(&String, usize)> = None;
        for candidate in &self.sorted {
            if candidate.chars().count().abs_diff(length) > MAX_SUGGESTION_DISTANCE {
                continue;
            }
            let distance = edit_distance(word, candidate);
            // `sorted` is in lexicographic order, so a strict comparison keeps the first on ties
            if distance <= MAX_SUGGESTION_DISTANCE && best.is_none_or(|(_, d)| distance < d) {
                best = Some((candidate, distance));
            }
        }
        best.map(|(w, d)| (w.clone(), d))
    }
}

/// Levenshtein distance over characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Dictionaries keyed by the locale they apply to. `None` holds root
/// dictionaries, which apply to every locale that has a dictionary of its own.
#[derive(Debug, Clone, Default)]
pub struct DictionaryRegistry {
    dictionaries: BTreeMap<Option<Locale>, Vec<Arc<dyn Dictionary>>>,
}

impl DictionaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, locale: Option<Locale>, dictionary: Arc<dyn Dictionary>) {
        self.dictionaries.entry(locale).or_default().push(dictionary);
    }

    /// Loads every `*.dic` and `*.txt` file of `dir`. The locale comes from the
    /// file name: `words_fr_CA.dic` is for `fr_CA`, `names.dic` is a root dictionary.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let read_dir = fs::read_dir(dir).map_err(|e| {
            Error::Dictionary(format!("cannot read directory {}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        for entry in read_dir {
            let path = entry?.path();
            let is_dictionary = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| DICTIONARY_EXTENSIONS.contains(&e));
            if path.is_file() && is_dictionary {
                paths.push(path);
            }
        }
        paths.sort();

        let mut registry = DictionaryRegistry::new();
        for path in paths {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            let (_, locale) = split_bundle_name(stem);
            let list = WordList::load(&path)?;
            let label = locale
                .as_ref()
                .map_or_else(|| "root".to_string(), ToString::to_string);
            tracing::debug!(
                file = %path.display(),
                locale = %label,
                words = list.len(),
                "loaded dictionary"
            );
            registry.register(locale, Arc::new(list));
        }
        Ok(registry)
    }

    /// Dictionaries registered for exactly `locale`.
    pub fn for_locale(&self, locale: &Locale) -> &[Arc<dyn Dictionary>] {
        self.dictionaries
            .get(&Some(locale.clone()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn root(&self) -> &[Arc<dyn Dictionary>] {
        self.dictionaries
            .get(&None)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionaries.is_empty()
    }
}
