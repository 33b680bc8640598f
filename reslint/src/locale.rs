//! Locale identifiers as they appear in bundle file names.
//!
//! Bundle files follow `base[_language[_COUNTRY[_variant]]]`. The language and
//! country subtags are checked with `unic-langid`; the variant is free-form.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;
use unic_langid::subtags::{Language, Region};

/// A `language[_COUNTRY[_variant]]` locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Locale {
    language: String,
    country: Option<String>,
    variant: Option<String>,
}

impl Locale {
    /// Locale assumed for the locale-less root file.
    pub fn english() -> Self {
        Locale {
            language: "en".to_string(),
            country: None,
            variant: None,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Returns the next less specific locale: the variant is stripped first,
    /// then the country. A language-only locale has no parent.
    pub fn parent(&self) -> Option<Locale> {
        if self.variant.is_some() {
            Some(Locale {
                language: self.language.clone(),
                country: self.country.clone(),
                variant: None,
            })
        } else if self.country.is_some() {
            Some(Locale {
                language: self.language.clone(),
                country: None,
                variant: None,
            })
        } else {
            None
        }
    }

    /// This locale followed by each of its ancestors, most specific first.
    pub fn hierarchy(&self) -> Vec<Locale> {
        let mut chain = vec![self.clone()];
        while let Some(parent) = chain.last().and_then(Locale::parent) {
            chain.push(parent);
        }
        chain
    }

    /// Builds a locale from the `_`-separated tokens that follow a base name.
    /// Returns `None` when the tokens do not form a locale suffix.
    pub fn from_tokens(tokens: &[&str]) -> Option<Locale> {
        let (language, rest) = tokens.split_first()?;
        if rest.len() > 2 || !is_language_subtag(language) {
            return None;
        }
        let country = match rest.first() {
            Some(country) if is_country_subtag(country) => Some(country.to_string()),
            // `messages_fr__POSIX` style: empty country with a variant
            Some(country) if country.is_empty() && rest.len() == 2 => None,
            Some(_) => return None,
            None => None,
        };
        let variant = match rest.get(1) {
            Some(variant) if !variant.is_empty() => Some(variant.to_string()),
            Some(_) => return None,
            None => None,
        };
        Some(Locale {
            language: language.to_string(),
            country,
            variant,
        })
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split(['_', '-']).collect();
        Locale::from_tokens(&tokens).ok_or_else(|| format!("Invalid locale: {}", s))
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.language)?;
        match (&self.country, &self.variant) {
            (Some(country), Some(variant)) => write!(f, "_{}_{}", country, variant),
            (Some(country), None) => write!(f, "_{}", country),
            (None, Some(variant)) => write!(f, "__{}", variant),
            (None, None) => Ok(()),
        }
    }
}

/// Splits a file stem into `(base name, locale)` following the bundle naming
/// convention. The shortest base name that leaves a valid locale suffix wins;
/// a stem without any valid suffix is its own base name with no locale.
pub fn split_bundle_name(stem: &str) -> (String, Option<Locale>) {
    let tokens: Vec<&str> = stem.split('_').collect();
    let first_candidate = tokens.len().saturating_sub(3).max(1);
    for start in first_candidate..tokens.len() {
        if tokens[..start].iter().all(|t| t.is_empty()) {
            continue;
        }
        if let Some(locale) = Locale::from_tokens(&tokens[start..]) {
            return (tokens[..start].join("_"), Some(locale));
        }
    }
    (stem.to_string(), None)
}

// Bundle naming convention uses lower-case language codes
fn is_language_subtag(token: &str) -> bool {
    (2..=3).contains(&token.len())
        && token.chars().all(|c| c.is_ascii_lowercase())
        && Language::from_str(token).is_ok()
}

// ... and upper-case alpha-2 or numeric UN M.49 region codes
fn is_country_subtag(token: &str) -> bool {
    let shaped = (token.len() == 2 && token.chars().all(|c| c.is_ascii_uppercase()))
        || (token.len() == 3 && token.chars().all(|c| c.is_ascii_digit()));
    shaped && Region::from_str(token).is_ok()
}
