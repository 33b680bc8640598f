//! Parametric message syntaxes.
//!
//! A [`Formatter`] knows how placeholders are written in resource values: it
//! detects them, captures their indices for cross-locale comparison, and
//! renders a value with synthetic arguments so that markup and URL checks see
//! what the user will see.

pub mod c_style;
pub mod message_format;

use std::{fmt::Debug, sync::Arc};

use serde::Deserialize;
use thiserror::Error;

pub use c_style::CStyleFormatter;
pub use message_format::MessageFormatter;

/// The only way formatting a single value can fail. Never fatal to a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed parameter: {message}")]
pub struct FormattingError {
    pub kind: FormattingErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormattingErrorKind {
    MalformedParameter,
}

impl FormattingError {
    pub fn malformed(message: impl Into<String>) -> Self {
        FormattingError {
            kind: FormattingErrorKind::MalformedParameter,
            message: message.into(),
        }
    }
}

pub trait Formatter: Send + Sync + Debug {
    /// Whether the value contains at least one placeholder.
    fn is_parametric(&self, value: &str) -> bool;

    /// Placeholder indices used by the value, sorted and without repetition,
    /// so that locales ordering their parameters differently compare equal.
    fn capture_parameters(&self, value: &str) -> Vec<usize>;

    /// Renders the value with the argument for index `i` set to the integer `i`.
    fn default_format(&self, value: &str) -> Result<String, FormattingError>;

    /// How the placeholder for `index` is written, for diagnostics.
    fn display_indexed_parameter(&self, index: usize) -> String;

    /// Whether the value contains a quote that the syntax would consume.
    fn has_unescaped_quote(&self, _value: &str) -> bool {
        false
    }

    /// Renders a list of indices, e.g. `{0}, {2}`.
    fn display_parameters(&self, indices: &[usize]) -> String {
        indices
            .iter()
            .map(|&i| self.display_indexed_parameter(i))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Which formatter a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatterKind {
    /// `{0}`, `{1,number}`, `''` escaping.
    #[default]
    MessageFormat,
    /// `%1$s`, `%2$d`.
    CStyle,
}

impl FormatterKind {
    pub fn build(self) -> Arc<dyn Formatter> {
        match self {
            FormatterKind::MessageFormat => Arc::new(MessageFormatter::new()),
            FormatterKind::CStyle => Arc::new(CStyleFormatter::new()),
        }
    }
}

/// The value as it will be rendered: parametric values go through the
/// formatter, other values only get their doubled single quotes collapsed.
pub fn render_value(formatter: &dyn Formatter, value: &str) -> Result<String, FormattingError> {
    if formatter.is_parametric(value) {
        formatter.default_format(value)
    } else {
        Ok(collapse_doubled_quotes(value))
    }
}

pub fn collapse_doubled_quotes(value: &str) -> String {
    value.replace("''", "'")
}
