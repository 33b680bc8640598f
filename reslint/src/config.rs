//! Run configuration, usually read from a TOML file.
//!
//! ```toml
//! html_keys = [".html"]
//! url_keys = [".url", ".href"]
//! excluded_keys = ["legacy."]
//! formatter = "message_format"
//! html_schema = "transitional"
//! dictionary_dir = "dictionaries"
//!
//! [[custom_patterns]]
//! name = "color"
//! regex = "#[0-9a-fA-F]{6}"
//! keys = [".color"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{error::Error, formatter::FormatterKind, xhtml::HtmlSchemaSource};

/// One user-defined value pattern, applied to keys containing one of `keys`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomPatternConfig {
    pub name: String,
    pub regex: String,
    #[serde(default)]
    pub keys: Vec<String>,
}

impl CustomPatternConfig {
    pub fn new(name: impl Into<String>, regex: impl Into<String>, keys: &[&str]) -> Self {
        CustomPatternConfig {
            name: name.into(),
            regex: regex.into(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Everything the engine needs besides the family itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Keys containing one of these substrings are skipped and reported as excluded.
    pub excluded_keys: Vec<String>,
    pub html_keys: Vec<String>,
    pub js_keys: Vec<String>,
    pub url_keys: Vec<String>,
    pub text_keys: Vec<String>,
    /// Tried in order after the built-in classifiers.
    pub custom_patterns: Vec<CustomPatternConfig>,
    /// Whether JS resources end up in double-quoted literals (otherwise single-quoted).
    pub js_double_quoted: bool,
    pub formatter: FormatterKind,
    pub html_schema: HtmlSchemaSource,
    /// Directory of word lists. Without one, spell-checking is off.
    pub dictionary_dir: Option<PathBuf>,
    /// Pattern locating references to other keys inside values.
    pub inner_resource_regex: Option<String>,
    /// Whether text nodes of valid HTML values are spell-checked.
    pub spellcheck_html: bool,
    /// Extension of the files forming the family, without the dot.
    pub file_extension: String,
}

impl Default for LintConfig {
    fn default() -> Self {
        LintConfig {
            excluded_keys: Vec::new(),
            html_keys: Vec::new(),
            js_keys: Vec::new(),
            url_keys: Vec::new(),
            text_keys: Vec::new(),
            custom_patterns: Vec::new(),
            js_double_quoted: true,
            formatter: FormatterKind::default(),
            html_schema: HtmlSchemaSource::default(),
            dictionary_dir: None,
            inner_resource_regex: None,
            spellcheck_html: true,
            file_extension: "properties".to_string(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl LintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let config: LintConfig = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Reads a TOML file. Relative `dictionary_dir` and schema paths are
    /// resolved against the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let Some(dir) = &mut self.dictionary_dir
            && dir.is_relative()
        {
            *dir = base.join(&*dir);
        }
        if let HtmlSchemaSource::File { path } = &mut self.html_schema
            && path.is_relative()
        {
            *path = base.join(&*path);
        }
    }

    fn check(&self) -> Result<(), Error> {
        if self.file_extension.is_empty() || self.file_extension.starts_with('.') {
            return Err(Error::config_error(format!(
                "file_extension must be a bare extension, got {:?}",
                self.file_extension
            )));
        }
        let classifiers = [
            ("excluded_keys", &self.excluded_keys),
            ("html_keys", &self.html_keys),
            ("js_keys", &self.js_keys),
            ("url_keys", &self.url_keys),
            ("text_keys", &self.text_keys),
        ];
        for (name, patterns) in classifiers {
            if patterns.iter().any(String::is_empty) {
                return Err(Error::config_error(format!(
                    "{} contains an empty pattern, which would match every key",
                    name
                )));
            }
        }
        for pattern in &self.custom_patterns {
            if pattern.name.is_empty() {
                return Err(Error::config_error("custom pattern without a name"));
            }
            if pattern.keys.iter().any(String::is_empty) {
                return Err(Error::config_error(format!(
                    "custom pattern {} contains an empty key pattern",
                    pattern.name
                )));
            }
        }
        Ok(())
    }

    pub fn with_excluded_keys(mut self, keys: &[&str]) -> Self {
        self.excluded_keys = strings(keys);
        self
    }

    pub fn with_html_keys(mut self, keys: &[&str]) -> Self {
        self.html_keys = strings(keys);
        self
    }

    pub fn with_js_keys(mut self, keys: &[&str]) -> Self {
        self.js_keys = strings(keys);
        self
    }

    pub fn with_url_keys(mut self, keys: &[&str]) -> Self {
        self.url_keys = strings(keys);
        self
    }

    pub fn with_text_keys(mut self, keys: &[&str]) -> Self {
        self.text_keys = strings(keys);
        self
    }

    pub fn with_custom_pattern(mut self, pattern: CustomPatternConfig) -> Self {
        self.custom_patterns.push(pattern);
        self
    }

    pub fn with_js_double_quoted(mut self, double_quoted: bool) -> Self {
        self.js_double_quoted = double_quoted;
        self
    }

    pub fn with_formatter(mut self, formatter: FormatterKind) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_html_schema(mut self, schema: HtmlSchemaSource) -> Self {
        self.html_schema = schema;
        self
    }

    pub fn with_dictionary_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dictionary_dir = Some(dir.into());
        self
    }

    pub fn with_inner_resource_regex(mut self, regex: impl Into<String>) -> Self {
        self.inner_resource_regex = Some(regex.into());
        self
    }

    pub fn with_spellcheck_html(mut self, enabled: bool) -> Self {
        self.spellcheck_html = enabled;
        self
    }

    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }
}
