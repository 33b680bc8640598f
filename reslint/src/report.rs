//! Validation findings and their aggregation.
//!
//! Every rule violation becomes a [`ReportItem`]. Items order by severity,
//! then type, then key, then file; two items with the same ordering fields are
//! equal regardless of their message, which lets the reporting layer collapse
//! repeated findings.

use std::cmp::Ordering;
use std::fmt::Display;

use serde::Serialize;

/// Severity of a finding. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warn => write!(f, "WARN"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// Closed set of finding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportItemType {
    DuplicateKey,
    MalformedParameter,
    ParametricQuote,
    HtmlValidation,
    JsDoubleQuotedValidation,
    JsSingleQuotedValidation,
    JsNewlineValidation,
    UrlValidation,
    TextValidationNoHtml,
    TextValidationNoUrl,
    CustomPatternValidation,
    InnerResource,
    TrailingWhitespace,
    UndeclaredHtml,
    UndeclaredUrl,
    Spellcheck,
    MissingTranslation,
    AlmostIdenticalTranslation,
    IncoherentParameters,
    IncoherentTags,
    IdenticalTranslation,
    DuplicateValue,
    Excluded,
}

impl ReportItemType {
    pub fn default_severity(self) -> Severity {
        use ReportItemType::*;
        match self {
            DuplicateKey
            | MalformedParameter
            | ParametricQuote
            | HtmlValidation
            | JsDoubleQuotedValidation
            | JsSingleQuotedValidation
            | JsNewlineValidation
            | UrlValidation
            | TextValidationNoHtml
            | TextValidationNoUrl
            | CustomPatternValidation
            | InnerResource => Severity::Error,
            TrailingWhitespace
            | UndeclaredHtml
            | UndeclaredUrl
            | Spellcheck
            | MissingTranslation
            | AlmostIdenticalTranslation
            | IncoherentParameters
            | IncoherentTags => Severity::Warn,
            IdenticalTranslation | DuplicateValue | Excluded => Severity::Info,
        }
    }

    /// Stable identifier, also the suffix of the title/description message keys.
    pub fn code(self) -> &'static str {
        use ReportItemType::*;
        match self {
            DuplicateKey => "DUPLICATE_KEY",
            MalformedParameter => "MALFORMED_PARAMETER",
            ParametricQuote => "PARAMETRIC_QUOTE",
            HtmlValidation => "HTML_VALIDATION",
            JsDoubleQuotedValidation => "JS_DOUBLE_QUOTED_VALIDATION",
            JsSingleQuotedValidation => "JS_SINGLE_QUOTED_VALIDATION",
            JsNewlineValidation => "JS_NEWLINE_VALIDATION",
            UrlValidation => "URL_VALIDATION",
            TextValidationNoHtml => "TEXT_VALIDATION_NO_HTML",
            TextValidationNoUrl => "TEXT_VALIDATION_NO_URL",
            CustomPatternValidation => "CUSTOM_PATTERN_VALIDATION",
            InnerResource => "INNER_RESOURCE",
            TrailingWhitespace => "TRAILING_WHITESPACE",
            UndeclaredHtml => "UNDECLARED_HTML",
            UndeclaredUrl => "UNDECLARED_URL",
            Spellcheck => "SPELLCHECK",
            MissingTranslation => "MISSING_TRANSLATION",
            AlmostIdenticalTranslation => "ALMOST_IDENTICAL_TRANSLATION",
            IncoherentParameters => "INCOHERENT_PARAMETERS",
            IncoherentTags => "INCOHERENT_TAGS",
            IdenticalTranslation => "IDENTICAL_TRANSLATION",
            DuplicateValue => "DUPLICATE_VALUE",
            Excluded => "EXCLUDED",
        }
    }

    /// Message key of the human-readable title, e.g. `report.type.html_validation.title`.
    pub fn title_key(self) -> String {
        format!("report.type.{}.title", self.code().to_ascii_lowercase())
    }

    /// Message key of the human-readable description.
    pub fn description_key(self) -> String {
        format!("report.type.{}.description", self.code().to_ascii_lowercase())
    }

    /// English title, used when no message catalog is available.
    pub fn title(self) -> &'static str {
        use ReportItemType::*;
        match self {
            DuplicateKey => "Duplicate key",
            MalformedParameter => "Malformed parameter",
            ParametricQuote => "Unescaped quote in parametric value",
            HtmlValidation => "Invalid HTML",
            JsDoubleQuotedValidation => "Unescaped double quote in JavaScript string",
            JsSingleQuotedValidation => "Unescaped single quote in JavaScript string",
            JsNewlineValidation => "Unescaped newline in JavaScript string",
            UrlValidation => "Invalid URL",
            TextValidationNoHtml => "HTML in plain text",
            TextValidationNoUrl => "URL in plain text",
            CustomPatternValidation => "Value does not match pattern",
            InnerResource => "Unknown inner resource reference",
            TrailingWhitespace => "Trailing whitespace",
            UndeclaredHtml => "Undeclared HTML",
            UndeclaredUrl => "Undeclared URL",
            Spellcheck => "Spelling",
            MissingTranslation => "Missing translation",
            AlmostIdenticalTranslation => "Almost identical translation",
            IncoherentParameters => "Incoherent parameters",
            IncoherentTags => "Incoherent HTML tags",
            IdenticalTranslation => "Identical translation",
            DuplicateValue => "Duplicated value",
            Excluded => "Excluded key",
        }
    }

    /// English description of what the finding means.
    pub fn description(self) -> &'static str {
        use ReportItemType::*;
        match self {
            DuplicateKey => "The key is defined more than once in the same file.",
            MalformedParameter => "The parametric syntax of the value cannot be formatted.",
            ParametricQuote => {
                "A single quote in a parametric value must be doubled, otherwise it starts a quoted section."
            }
            HtmlValidation => "The value is not valid markup for the configured HTML schema.",
            JsDoubleQuotedValidation => {
                "Double quotes must be escaped inside a double-quoted JavaScript string."
            }
            JsSingleQuotedValidation => {
                "Single quotes must be escaped inside a single-quoted JavaScript string."
            }
            JsNewlineValidation => "Line breaks must be escaped inside a JavaScript string.",
            UrlValidation => "The value is not an absolute, protocol-relative or mailto URL.",
            TextValidationNoHtml => "Plain text values must not contain HTML markup.",
            TextValidationNoUrl => "Plain text values must not contain URLs.",
            CustomPatternValidation => "The value does not match the configured pattern.",
            InnerResource => "The value references a key that does not exist.",
            TrailingWhitespace => "The value ends with whitespace.",
            UndeclaredHtml => "The value looks like HTML but the key is not declared as HTML.",
            UndeclaredUrl => "The value looks like a URL but the key is not declared as URL.",
            Spellcheck => "The value contains words unknown to the dictionaries of its locale.",
            MissingTranslation => "The key is not translated in every locale.",
            AlmostIdenticalTranslation => {
                "Most locales share one value; the others may be untranslated copies."
            }
            IncoherentParameters => "Locales use different parameter sets.",
            IncoherentTags => "Locales use different HTML tag structures.",
            IdenticalTranslation => "Every locale has the same value.",
            DuplicateValue => "Several keys of the same file share this value.",
            Excluded => "The key is excluded from validation.",
        }
    }
}

impl Display for ReportItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One validation finding.
#[derive(Debug, Clone, Serialize)]
pub struct ReportItem {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub item_type: ReportItemType,
    pub location_file: String,
    pub location_key: String,
    pub raw_value: String,
    /// The value actually evaluated, after parametric substitution.
    pub formatted_value: String,
    pub message: String,
}

impl ReportItem {
    /// Creates an item with the type's default severity and `formatted_value == raw_value`.
    pub fn new(
        item_type: ReportItemType,
        location_file: impl Into<String>,
        location_key: impl Into<String>,
        raw_value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let raw_value = raw_value.into();
        ReportItem {
            severity: item_type.default_severity(),
            item_type,
            location_file: location_file.into(),
            location_key: location_key.into(),
            formatted_value: raw_value.clone(),
            raw_value,
            message: message.into(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_formatted_value(mut self, formatted_value: impl Into<String>) -> Self {
        self.formatted_value = formatted_value.into();
        self
    }
}

impl Ord for ReportItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.severity
            .cmp(&other.severity)
            .then_with(|| self.item_type.cmp(&other.item_type))
            .then_with(|| self.location_key.cmp(&other.location_key))
            .then_with(|| self.location_file.cmp(&other.location_file))
    }
}

impl PartialOrd for ReportItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ReportItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ReportItem {}

impl Display for ReportItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {}#{}: {}",
            self.severity, self.item_type, self.location_file, self.location_key, self.message
        )
    }
}

/// All findings of one validation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    items: Vec<ReportItem>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: ReportItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ReportItem>) {
        self.items.extend(items);
    }

    /// Every item, in the order it was produced.
    pub fn items(&self) -> &[ReportItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ReportItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of ERROR items. WARN and INFO never count.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|i| i.severity == severity).count()
    }

    pub fn count_of_type(&self, item_type: ReportItemType) -> usize {
        self.items.iter().filter(|i| i.item_type == item_type).count()
    }

    /// Items in display order. The sort is stable, so equal items keep
    /// their production order.
    pub fn sorted(&self) -> Vec<&ReportItem> {
        let mut sorted: Vec<&ReportItem> = self.items.iter().collect();
        sorted.sort();
        sorted
    }

    /// Sorted items with equal items collapsed into their first occurrence,
    /// paired with the number of occurrences.
    pub fn collapsed(&self) -> Vec<(&ReportItem, usize)> {
        let mut collapsed: Vec<(&ReportItem, usize)> = Vec::new();
        for item in self.sorted() {
            match collapsed.last_mut() {
                Some((last, count)) if *last == item => *count += 1,
                _ => collapsed.push((item, 1)),
            }
        }
        collapsed
    }
}
