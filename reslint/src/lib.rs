#![forbid(unsafe_code)]
//! Localization resource linter for Rust.
//!
//! Loads a family of locale-variant `.properties` bundles from one directory
//! and validates every entry against how it will be consumed (HTML fragment,
//! JavaScript string, URL, plain text or a custom pattern), then compares
//! each key across locales for missing translations, copied values, diverging
//! parameters and diverging markup.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use reslint::{Engine, LintConfig};
//!
//! let config = LintConfig::new()
//!     .with_html_keys(&[".html"])
//!     .with_url_keys(&[".url"]);
//! let report = Engine::new(config)?.validate_directory("i18n/messages")?;
//! for (item, count) in report.collapsed() {
//!     println!("{} (x{})", item, count);
//! }
//! # Ok::<(), reslint::Error>(())
//! ```
//!
//! # Findings
//!
//! - **ERROR**: broken markup, unescaped JS quotes, invalid URLs, malformed
//!   placeholders, duplicate keys, unknown key references
//! - **WARN**: trailing whitespace, undeclared markup or URLs, misspellings,
//!   partial translations, incoherent parameters or tags
//! - **INFO**: identical translations, duplicated values, excluded keys

pub mod coherence;
pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod locale;
pub mod properties;
pub mod report;
pub mod spelling;
pub mod traits;
pub mod types;
pub mod validators;
pub mod xhtml;

// Re-export most used types for easy consumption
pub use crate::{
    config::{CustomPatternConfig, LintConfig},
    engine::Engine,
    error::Error,
    formatter::{Formatter, FormatterKind, FormattingError},
    locale::Locale,
    report::{Report, ReportItem, ReportItemType, Severity},
    types::{Resource, ResourceFamily, ResourceFamilyView, ResourceFile},
    xhtml::{BuiltinSchema, HtmlSchemaSource},
};
