//! Per-resource validators and the dispatch policy choosing among them.
//!
//! Every non-empty value goes through the unconditional checks first
//! (trailing whitespace, parametric quotes, duplicated values, inner
//! references). The key then selects exactly one content validator, tried in
//! this order: HTML, JavaScript, URL, plain text, each custom pattern. Keys
//! matching none of them get the default validator.

pub mod custom_pattern;
pub mod default;
pub mod duplicate;
pub mod html;
pub mod inner_resource;
pub mod js;
pub mod parametric_quote;
pub mod spellcheck;
pub mod text;
pub mod trailing_whitespace;
pub mod url;

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    config::LintConfig,
    error::Error,
    formatter::Formatter,
    report::ReportItem,
    traits::ResourceValidator,
    types::Resource,
    xhtml::HtmlSchema,
};

pub use custom_pattern::CustomPatternValidator;
pub use default::DefaultValidator;
pub use duplicate::{DuplicateKeyValidator, DuplicateValueValidator};
pub use html::HtmlValidator;
pub use inner_resource::InnerResourceValidator;
pub use js::JsValidator;
pub use parametric_quote::ParametricQuoteValidator;
pub use spellcheck::SpellCheckValidator;
pub use text::TextValidator;
pub use trailing_whitespace::TrailingWhitespaceValidator;
pub use url::UrlValidator;

lazy_static! {
    /// Crude "contains a tag" test: `<b>`, `</p>`, `<br/>`, `<a href=…>`.
    pub(crate) static ref LOOKS_LIKE_HTML: Regex =
        Regex::new(r"</?[A-Za-z][A-Za-z0-9]*(?:\s[^<>]*)?/?>").unwrap();
    /// Crude "contains a URL" test.
    pub(crate) static ref LOOKS_LIKE_URL: Regex = Regex::new(r"//|mailto:").unwrap();
}

/// Substring classifier over key names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyClassifier {
    patterns: Vec<String>,
}

impl KeyClassifier {
    pub fn new(patterns: &[String]) -> Self {
        KeyClassifier {
            patterns: patterns.to_vec(),
        }
    }

    /// Whether `key` contains one of the patterns. An empty classifier matches nothing.
    pub fn matches(&self, key: &str) -> bool {
        self.patterns.iter().any(|p| key.contains(p.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// A content validator and the keys it is responsible for.
struct Route {
    name: String,
    keys: KeyClassifier,
    validator: Box<dyn ResourceValidator>,
}

/// The resource validator: unconditional checks, then first-match routing.
pub struct ResourceDispatcher {
    duplicate_keys: DuplicateKeyValidator,
    always: Vec<Box<dyn ResourceValidator>>,
    routes: Vec<Route>,
    fallback: Box<dyn ResourceValidator>,
}

impl ResourceDispatcher {
    /// Wires every validator from the configuration. Invalid regular
    /// expressions are fatal here, before any resource is looked at.
    pub fn from_config(
        config: &LintConfig,
        formatter: Arc<dyn Formatter>,
        schema: Arc<HtmlSchema>,
        spellcheck: Option<Arc<SpellCheckValidator>>,
    ) -> Result<Self, Error> {
        let mut always: Vec<Box<dyn ResourceValidator>> = vec![
            Box::new(TrailingWhitespaceValidator),
            Box::new(ParametricQuoteValidator::new(formatter.clone())),
            Box::new(DuplicateValueValidator),
        ];
        if let Some(regex) = &config.inner_resource_regex {
            always.push(Box::new(InnerResourceValidator::new(regex)?));
        }

        let html_spellcheck = spellcheck.clone().filter(|_| config.spellcheck_html);
        let html = Arc::new(HtmlValidator::new(formatter.clone(), schema, html_spellcheck));

        let mut routes = vec![
            Route {
                name: "html".to_string(),
                keys: KeyClassifier::new(&config.html_keys),
                validator: Box::new(html.clone()),
            },
            Route {
                name: "js".to_string(),
                keys: KeyClassifier::new(&config.js_keys),
                validator: Box::new(JsValidator::new(config.js_double_quoted, html)),
            },
            Route {
                name: "url".to_string(),
                keys: KeyClassifier::new(&config.url_keys),
                validator: Box::new(UrlValidator::new(formatter.clone())),
            },
            Route {
                name: "text".to_string(),
                keys: KeyClassifier::new(&config.text_keys),
                validator: Box::new(TextValidator::new(spellcheck.clone())),
            },
        ];
        for pattern in &config.custom_patterns {
            routes.push(Route {
                name: pattern.name.clone(),
                keys: KeyClassifier::new(&pattern.keys),
                validator: Box::new(CustomPatternValidator::new(&pattern.name, &pattern.regex)?),
            });
        }

        Ok(ResourceDispatcher {
            duplicate_keys: DuplicateKeyValidator,
            always,
            routes,
            fallback: Box::new(DefaultValidator::new(spellcheck)),
        })
    }

    /// Name of the content validator `key` is routed to.
    pub fn route_name(&self, key: &str) -> &str {
        self.routes
            .iter()
            .find(|route| route.keys.matches(key))
            .map_or("default", |route| route.name.as_str())
    }
}

impl ResourceValidator for ResourceDispatcher {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        let mut items = self.duplicate_keys.validate(resource);
        if resource.value.is_empty() {
            return items;
        }
        for validator in &self.always {
            items.extend(validator.validate(resource));
        }
        let content = self
            .routes
            .iter()
            .find(|route| route.keys.matches(resource.key))
            .map_or(self.fallback.as_ref(), |route| route.validator.as_ref());
        items.extend(content.validate(resource));
        items
    }
}

impl<T: ResourceValidator + ?Sized> ResourceValidator for Arc<T> {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        (**self).validate(resource)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{ResourceFamily, ResourceFile};

    /// A one-file family holding `key = value`, plus any `extra` lines.
    pub fn family_with(key: &str, value: &str, extra: &str) -> ResourceFamily {
        let escaped = value.replace('\\', "\\\\").replace('\n', "\\n");
        let content = format!("{} = {}\n{}", key, escaped, extra);
        let file = ResourceFile::from_content("messages_fr.properties", &content).unwrap();
        ResourceFamily::new(vec![file]).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CustomPatternConfig,
        formatter::FormatterKind,
        report::ReportItemType,
        types::{Resource, ResourceFamily, ResourceFile},
        xhtml::BuiltinSchema,
    };

    fn dispatcher(config: &LintConfig) -> ResourceDispatcher {
        ResourceDispatcher::from_config(
            config,
            FormatterKind::MessageFormat.build(),
            Arc::new(HtmlSchema::builtin(BuiltinSchema::Transitional)),
            None,
        )
        .unwrap()
    }

    fn config() -> LintConfig {
        LintConfig::new()
            .with_html_keys(&[".html"])
            .with_js_keys(&[".js"])
            .with_url_keys(&[".url"])
            .with_text_keys(&[".text"])
            .with_custom_pattern(CustomPatternConfig::new("digits", r"\d+", &[".count"]))
    }

    fn run(key: &str, value: &str) -> Vec<ReportItemType> {
        let family = test_support::family_with(key, value, "");
        let file = &family.files()[0];
        let resource = Resource::new(&family, file, key, file.get(key).unwrap());
        dispatcher(&config())
            .validate(&resource)
            .into_iter()
            .map(|item| item.item_type)
            .collect()
    }

    #[test]
    fn test_key_classifier() {
        let classifier = KeyClassifier::new(&[".html".to_string(), "help.".to_string()]);
        assert!(classifier.matches("page.html.title"));
        assert!(classifier.matches("help.intro"));
        assert!(!classifier.matches("title"));
        assert!(!KeyClassifier::default().matches("anything"));
    }

    #[test]
    fn test_route_priority() {
        let dispatcher = dispatcher(&config());
        assert_eq!(dispatcher.route_name("a.html.js"), "html");
        assert_eq!(dispatcher.route_name("a.js.url"), "js");
        assert_eq!(dispatcher.route_name("a.url.text"), "url");
        assert_eq!(dispatcher.route_name("a.text.count"), "text");
        assert_eq!(dispatcher.route_name("a.count"), "digits");
        assert_eq!(dispatcher.route_name("a.title"), "default");
    }

    #[test]
    fn test_routing_reaches_content_validators() {
        assert_eq!(run("a.html", "<b>x"), vec![ReportItemType::HtmlValidation]);
        assert_eq!(run("a.url", "not a url"), vec![ReportItemType::UrlValidation]);
        assert_eq!(run("a.text", "<b>x</b>"), vec![ReportItemType::TextValidationNoHtml]);
        assert_eq!(
            run("a.count", "twelve"),
            vec![ReportItemType::CustomPatternValidation]
        );
        assert_eq!(run("a.title", "<b>x</b>"), vec![ReportItemType::UndeclaredHtml]);
    }

    #[test]
    fn test_unconditional_checks_run_for_every_route() {
        assert_eq!(
            run("a.count", "12 "),
            vec![
                ReportItemType::TrailingWhitespace,
                ReportItemType::CustomPatternValidation
            ]
        );
        assert_eq!(
            run("a.html", "Don't delete {0}"),
            vec![ReportItemType::ParametricQuote]
        );
    }

    #[test]
    fn test_empty_value_only_reports_duplicates() {
        let file = ResourceFile::from_content(
            "messages.properties",
            "a.url = http://x/y.png\na.url =\n",
        )
        .unwrap();
        let family = ResourceFamily::new(vec![file]).unwrap();
        let file = &family.files()[0];
        let resource = Resource::new(&family, file, "a.url", "");
        let items = dispatcher(&config()).validate(&resource);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, ReportItemType::DuplicateKey);
    }

    #[test]
    fn test_invalid_custom_regex_is_fatal() {
        let config =
            LintConfig::new().with_custom_pattern(CustomPatternConfig::new("bad", "(", &["x"]));
        let result = ResourceDispatcher::from_config(
            &config,
            FormatterKind::MessageFormat.build(),
            Arc::new(HtmlSchema::builtin(BuiltinSchema::Strict)),
            None,
        );
        assert!(matches!(result, Err(Error::Regex(_))));
    }
}
