//! Markup validation through the synthetic XHTML document.

use std::sync::Arc;

use crate::{
    formatter::{Formatter, render_value},
    report::{ReportItem, ReportItemType, Severity},
    traits::ResourceValidator,
    types::Resource,
    xhtml::{HtmlSchema, ViolationLevel, parse_strict, strip_data_attributes},
};

/// Validates values used as HTML fragments.
///
/// The value is rendered through the formatter, stripped of `data-*`
/// attributes, wrapped in the XHTML scaffold and checked against the schema.
/// Text nodes of a valid fragment go to the spell checker when one is chained.
#[derive(Debug)]
pub struct HtmlValidator {
    formatter: Arc<dyn Formatter>,
    schema: Arc<HtmlSchema>,
    spellcheck: Option<Arc<super::SpellCheckValidator>>,
}

impl HtmlValidator {
    pub fn new(
        formatter: Arc<dyn Formatter>,
        schema: Arc<HtmlSchema>,
        spellcheck: Option<Arc<super::SpellCheckValidator>>,
    ) -> Self {
        HtmlValidator {
            formatter,
            schema,
            spellcheck,
        }
    }

    /// Validates `value` as the markup of `resource`. Used directly by
    /// validators that derive the markup from the raw value.
    pub fn validate_markup(&self, resource: &Resource<'_>, value: &str) -> Vec<ReportItem> {
        let item = |item_type: ReportItemType, formatted: &str, message: String| {
            ReportItem::new(
                item_type,
                resource.file_name(),
                resource.key,
                resource.value,
                message,
            )
            .with_formatted_value(formatted)
        };

        let rendered = match render_value(self.formatter.as_ref(), value) {
            Ok(rendered) => rendered,
            Err(err) => {
                return vec![item(ReportItemType::MalformedParameter, value, err.message)];
            }
        };
        let markup = strip_data_attributes(&rendered);

        let wrapper = match parse_strict(&markup) {
            Ok(wrapper) => wrapper,
            Err(err) => {
                return vec![item(ReportItemType::HtmlValidation, &rendered, err.to_string())];
            }
        };

        let violations = self.schema.validate(&wrapper);
        let valid = violations.iter().all(|v| v.level == ViolationLevel::Warning);
        let mut items: Vec<ReportItem> = violations
            .into_iter()
            .map(|violation| {
                let found = item(ReportItemType::HtmlValidation, &rendered, violation.message);
                match violation.level {
                    ViolationLevel::Error => found,
                    ViolationLevel::Warning => found.with_severity(Severity::Warn),
                }
            })
            .collect();

        if valid && let Some(spellcheck) = &self.spellcheck {
            items.extend(
                wrapper
                    .text_nodes()
                    .into_iter()
                    .filter_map(|text| spellcheck.check_text(resource, text)),
            );
        }
        items
    }
}

impl ResourceValidator for HtmlValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        self.validate_markup(resource, resource.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        formatter::FormatterKind,
        spelling::{DictionaryRegistry, SpellCheckResolver, WordList},
        validators::{SpellCheckValidator, test_support::family_with},
        xhtml::BuiltinSchema,
    };

    fn validator(spellcheck: bool) -> HtmlValidator {
        let formatter = FormatterKind::MessageFormat.build();
        let spellcheck = spellcheck.then(|| {
            let mut registry = DictionaryRegistry::new();
            registry.register(
                Some("fr".parse().unwrap()),
                Arc::new(WordList::parse("fr", "cliquez\nici\npour\naide\n")),
            );
            Arc::new(SpellCheckValidator::new(
                Arc::new(SpellCheckResolver::new(registry)),
                formatter.clone(),
            ))
        });
        HtmlValidator::new(
            formatter,
            Arc::new(HtmlSchema::builtin(BuiltinSchema::Transitional)),
            spellcheck,
        )
    }

    fn check(validator: &HtmlValidator, value: &str) -> Vec<ReportItem> {
        let family = family_with("k.html", "x", "");
        let file = &family.files()[0];
        validator.validate(&Resource::new(&family, file, "k.html", value))
    }

    #[test]
    fn test_valid_fragments() {
        let v = validator(false);
        assert!(check(&v, "Hello <b>{0}</b>&nbsp;&copy; 2024").is_empty());
        assert!(check(&v, r#"<a href="/x" data-track="y">link</a>"#).is_empty());
        assert!(check(&v, "l''avion <i>vole</i>").is_empty());
    }

    #[test]
    fn test_malformed_markup() {
        let items = check(&validator(false), "<b>bold");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, ReportItemType::HtmlValidation);
        assert_eq!(items[0].severity, Severity::Error);
    }

    #[test]
    fn test_schema_violations_and_warnings() {
        let items = check(&validator(false), r#"<p><div>x</div></p><font>y</font>"#);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].severity, Severity::Error);
        assert_eq!(items[1].severity, Severity::Warn);
    }

    #[test]
    fn test_substitution_failure_is_malformed_parameter() {
        let items = check(&validator(false), "<b>{0}</b> {1,currency}");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, ReportItemType::MalformedParameter);
    }

    #[test]
    fn test_formatted_value_is_rendered() {
        let items = check(&validator(false), "<b>{0}</i>");
        assert_eq!(items[0].raw_value, "<b>{0}</i>");
        assert_eq!(items[0].formatted_value, "<b>0</i>");
    }

    #[test]
    fn test_text_nodes_are_spellchecked() {
        let v = validator(true);
        let items = check(&v, "<a href='/help'>Cliquez ici</a> pour l'aidee");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, ReportItemType::Spellcheck);
        assert_eq!(items[0].formatted_value, " pour l'aidee");
    }

    #[test]
    fn test_invalid_markup_suppresses_spellcheck() {
        let items = check(&validator(true), "<blink>mauvais</blink>");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, ReportItemType::HtmlValidation);
    }
}
