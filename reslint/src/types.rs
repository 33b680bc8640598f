//! Core, in-memory model of a loaded bundle family.
//!
//! A [`ResourceFamily`] owns every [`ResourceFile`] of one directory. Validators
//! never see the family directly; they see a [`Resource`] (one key of one file)
//! or a [`ResourceFamilyView`] (one key across all files).

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt::Display,
    fs,
    path::Path,
};

use crate::{
    error::Error,
    locale::{Locale, split_bundle_name},
    properties::{DuplicateKey, PropertiesFile},
    traits::Parser,
};

/// One loaded locale variant file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    file_name: String,
    base_name: String,
    locale: Option<Locale>,
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    duplicate_keys: Vec<DuplicateKey>,
    duplicated_value_keys: BTreeSet<String>,
}

impl ResourceFile {
    /// Builds a file from its name and parsed content. The base name and
    /// locale are derived from the name.
    pub fn new(file_name: impl Into<String>, parsed: PropertiesFile) -> Self {
        let file_name = file_name.into();
        let stem = Path::new(&file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&file_name)
            .to_string();
        let (base_name, locale) = split_bundle_name(&stem);

        let index = parsed
            .entries
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (key.clone(), i))
            .collect();

        let mut keys_by_value: HashMap<&str, Vec<&str>> = HashMap::new();
        for (key, value) in &parsed.entries {
            if !value.is_empty() {
                keys_by_value.entry(value.as_str()).or_default().push(key);
            }
        }
        let duplicated_value_keys = keys_by_value
            .values()
            .filter(|keys| keys.len() > 1)
            .flatten()
            .map(|key| key.to_string())
            .collect();

        ResourceFile {
            file_name,
            base_name,
            locale,
            index,
            duplicated_value_keys,
            entries: parsed.entries,
            duplicate_keys: parsed.duplicates,
        }
    }

    /// Loads and parses one file. Malformed content is fatal.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidFamily(format!("invalid file name: {}", path.display())))?
            .to_string();
        let parsed = PropertiesFile::read_from(path)?;
        Ok(Self::new(file_name, parsed))
    }

    /// Convenience constructor from in-memory content, mainly for tests.
    pub fn from_content(file_name: &str, content: &str) -> Result<Self, Error> {
        Ok(Self::new(file_name, PropertiesFile::parse(content, file_name)?))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Base name as parsed from this file's own name.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    /// Entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys assigned more than once while loading.
    pub fn duplicate_keys(&self) -> &[DuplicateKey] {
        &self.duplicate_keys
    }

    /// Keys whose non-empty value is shared with at least one other key of this file.
    pub fn duplicated_value_keys(&self) -> &BTreeSet<String> {
        &self.duplicated_value_keys
    }

    /// Other keys of this file carrying exactly `value`.
    pub fn keys_with_value<'a>(&'a self, value: &'a str, except: &'a str) -> Vec<&'a str> {
        self.entries
            .iter()
            .filter(|(k, v)| v == value && k != except)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }

    fn detach_locale(&mut self) {
        self.locale = None;
    }
}

impl Display for ResourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name)
    }
}

/// All locale variants of one bundle. One directory holds one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFamily {
    base_name: String,
    files: Vec<ResourceFile>,
    root: Option<usize>,
    keys: BTreeSet<String>,
}

impl ResourceFamily {
    /// Groups already loaded files into a family.
    ///
    /// The family base name is the most common base name parsed from the file
    /// names, counting a file whose whole stem is another file's base name
    /// toward that stem. A file whose whole stem equals it is the root file.
    pub fn new(mut files: Vec<ResourceFile>) -> Result<Self, Error> {
        if files.is_empty() {
            return Err(Error::InvalidFamily("no resource files".to_string()));
        }
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        let base_name = most_common_base_name(&files);
        let roots: Vec<usize> = files
            .iter()
            .enumerate()
            .filter(|(_, file)| file.stem() == base_name)
            .map(|(i, _)| i)
            .collect();
        if let [first, second, ..] = roots.as_slice() {
            return Err(Error::InvalidFamily(format!(
                "more than one root file: {} and {}",
                files[*first].file_name, files[*second].file_name
            )));
        }
        let root = roots.first().copied();

        for (i, file) in files.iter_mut().enumerate() {
            if Some(i) == root {
                file.detach_locale();
                file.base_name = base_name.clone();
            } else if file.base_name != base_name {
                tracing::warn!(
                    file = %file.file_name,
                    base_name = %file.base_name,
                    family = %base_name,
                    "file does not share the family base name"
                );
            }
        }

        let keys = files
            .iter()
            .flat_map(|f| f.entries.iter().map(|(k, _)| k.clone()))
            .collect();

        Ok(ResourceFamily {
            base_name,
            files,
            root,
            keys,
        })
    }

    /// Loads every file with the given extension in `dir` as one family.
    pub fn load_dir<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(Error::InvalidFamily(format!(
                "no *.{} files in {}",
                extension,
                dir.display()
            )));
        }

        let files = paths
            .iter()
            .map(ResourceFile::load)
            .collect::<Result<Vec<_>, _>>()?;
        let family = Self::new(files)?;
        tracing::info!(
            base_name = %family.base_name,
            files = family.files.len(),
            keys = family.keys.len(),
            "loaded resource family"
        );
        Ok(family)
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// All files, sorted by file name.
    pub fn files(&self) -> &[ResourceFile] {
        &self.files
    }

    /// The locale-less reference file, if any.
    pub fn root_file(&self) -> Option<&ResourceFile> {
        self.root.map(|i| &self.files[i])
    }

    pub fn is_root(&self, file: &ResourceFile) -> bool {
        self.root_file().is_some_and(|root| std::ptr::eq(root, file))
    }

    /// Every file except the root file.
    pub fn non_root_files(&self) -> impl Iterator<Item = &ResourceFile> {
        self.files
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != self.root)
            .map(|(_, f)| f)
    }

    /// Union of the keys of every file, sorted.
    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Projects one key across the family.
    pub fn view<'a>(&'a self, key: &'a str) -> ResourceFamilyView<'a> {
        ResourceFamilyView { family: self, key }
    }
}

fn most_common_base_name(files: &[ResourceFile]) -> String {
    let parsed: BTreeSet<&str> = files.iter().map(|f| f.base_name.as_str()).collect();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for file in files {
        // A stem that is another file's base name is the root, whatever its suffix looks like
        let vote = if parsed.contains(file.stem()) {
            file.stem()
        } else {
            file.base_name.as_str()
        };
        *counts.entry(vote).or_default() += 1;
    }
    // Ties go to the longest, then lexicographically first, base name
    counts
        .into_iter()
        .max_by(|(a, count_a), (b, count_b)| {
            count_a
                .cmp(count_b)
                .then_with(|| a.len().cmp(&b.len()))
                .then_with(|| b.cmp(a))
        })
        .map(|(name, _)| name.to_string())
        .unwrap_or_default()
}

/// One key's values across a family. Derived on demand, never stored.
#[derive(Debug, Clone, Copy)]
pub struct ResourceFamilyView<'a> {
    family: &'a ResourceFamily,
    key: &'a str,
}

impl<'a> ResourceFamilyView<'a> {
    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn family(&self) -> &'a ResourceFamily {
        self.family
    }

    /// Files where the key is present with a non-empty value, paired with that value.
    pub fn existing(&self) -> Vec<(&'a ResourceFile, &'a str)> {
        self.family
            .files
            .iter()
            .filter_map(|f| f.get(self.key).filter(|v| !v.is_empty()).map(|v| (f, v)))
            .collect()
    }

    pub fn existing_files(&self) -> Vec<&'a ResourceFile> {
        self.existing().into_iter().map(|(f, _)| f).collect()
    }

    /// Files where the key is absent or empty, optionally leaving out the root file.
    pub fn missing_files(&self, exclude_root: bool) -> Vec<&'a ResourceFile> {
        self.family
            .files
            .iter()
            .filter(|f| !(exclude_root && self.family.is_root(f)))
            .filter(|f| f.get(self.key).is_none_or(str::is_empty))
            .collect()
    }

    /// Distinct non-empty values mapped to the files sharing that exact value.
    pub fn grouped_values(&self) -> BTreeMap<&'a str, Vec<&'a ResourceFile>> {
        let mut groups: BTreeMap<&'a str, Vec<&'a ResourceFile>> = BTreeMap::new();
        for (file, value) in self.existing() {
            groups.entry(value).or_default().push(file);
        }
        groups
    }
}

/// A single `(file, key, value)` validation unit.
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    pub family: &'a ResourceFamily,
    pub file: &'a ResourceFile,
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> Resource<'a> {
    pub fn new(
        family: &'a ResourceFamily,
        file: &'a ResourceFile,
        key: &'a str,
        value: &'a str,
    ) -> Self {
        Resource {
            family,
            file,
            key,
            value,
        }
    }

    /// The same location with a different value, e.g. the text of one HTML node.
    pub fn with_value(&self, value: &'a str) -> Self {
        Resource { value, ..*self }
    }

    /// Locale of the owning file; the root file is treated as English.
    pub fn effective_locale(&self) -> Locale {
        self.file.locale().cloned().unwrap_or_else(Locale::english)
    }

    pub fn file_name(&self) -> &'a str {
        self.file.file_name()
    }
}

/// Comma-separated file names, for report messages and family-level locations.
pub fn join_file_names<'a>(files: impl IntoIterator<Item = &'a ResourceFile>) -> String {
    files
        .into_iter()
        .map(ResourceFile::file_name)
        .collect::<Vec<_>>()
        .join(", ")
}
