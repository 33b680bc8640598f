use std::sync::Arc;

use crate::{
    formatter::{Formatter, render_value},
    report::{ReportItem, ReportItemType},
    spelling::{SpellCheckResolver, apply_corrections},
    traits::ResourceValidator,
    types::Resource,
};

/// Spell-checks values with the checker of the owning file's locale.
///
/// One `SPELLCHECK` warning lists every unknown word of a value together with
/// the value as it reads with all suggestions applied.
#[derive(Debug)]
pub struct SpellCheckValidator {
    resolver: Arc<SpellCheckResolver>,
    formatter: Arc<dyn Formatter>,
}

impl SpellCheckValidator {
    pub fn new(resolver: Arc<SpellCheckResolver>, formatter: Arc<dyn Formatter>) -> Self {
        SpellCheckValidator {
            resolver,
            formatter,
        }
    }

    /// Checks `text`, some rendering of the resource's value such as one
    /// HTML text node.
    pub fn check_text(&self, resource: &Resource<'_>, text: &str) -> Option<ReportItem> {
        let checker = self.resolver.checker_for(&resource.effective_locale())?;
        let misspellings = checker.check(text);
        if misspellings.is_empty() {
            return None;
        }

        let words = misspellings
            .iter()
            .map(|m| match &m.suggestion {
                Some(suggestion) => format!("{} ({})", m.word, suggestion),
                None => m.word.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let correction = apply_corrections(text, &misspellings);

        Some(
            ReportItem::new(
                ReportItemType::Spellcheck,
                resource.file_name(),
                resource.key,
                resource.value,
                format!("misspelled: {}; suggested: \"{}\"", words, correction),
            )
            .with_formatted_value(text),
        )
    }
}

impl ResourceValidator for SpellCheckValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        // Placeholders are replaced by digits, which the tokenizer skips
        let rendered = render_value(self.formatter.as_ref(), resource.value)
            .unwrap_or_else(|_| resource.value.to_string());
        self.check_text(resource, &rendered).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        formatter::FormatterKind,
        spelling::{DictionaryRegistry, WordList},
        validators::test_support::family_with,
    };

    fn validator(kind: FormatterKind) -> SpellCheckValidator {
        let mut registry = DictionaryRegistry::new();
        registry.register(
            Some("fr".parse().unwrap()),
            Arc::new(WordList::parse("fr", "bonjour\nle\nmonde\nfichiers\n")),
        );
        SpellCheckValidator::new(Arc::new(SpellCheckResolver::new(registry)), kind.build())
    }

    #[test]
    fn test_one_item_per_value() {
        let family = family_with("k", "bonjor le mnde", "");
        let file = &family.files()[0];
        let items = validator(FormatterKind::MessageFormat)
            .validate(&Resource::new(&family, file, "k", "bonjor le mnde"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].severity, crate::report::Severity::Warn);
        assert!(items[0].message.contains("bonjor (bonjour)"));
        assert!(items[0].message.contains("\"bonjour le monde\""));
    }

    #[test]
    fn test_placeholders_are_not_words() {
        let family = family_with("k", "x", "");
        let file = &family.files()[0];
        let resource = Resource::new(&family, file, "k", "{0} fichiers");
        assert!(validator(FormatterKind::MessageFormat).validate(&resource).is_empty());
        let resource = Resource::new(&family, file, "k", "%1$s fichiers");
        assert!(validator(FormatterKind::CStyle).validate(&resource).is_empty());
    }

    #[test]
    fn test_locale_without_dictionary_is_skipped() {
        let file = crate::types::ResourceFile::from_content("messages_de.properties", "k = xyzzy\n")
            .unwrap();
        let family = crate::types::ResourceFamily::new(vec![file]).unwrap();
        let file = &family.files()[0];
        let items = validator(FormatterKind::MessageFormat)
            .validate(&Resource::new(&family, file, "k", "xyzzy"));
        assert!(items.is_empty());
    }
}
