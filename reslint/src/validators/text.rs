use std::sync::Arc;

use crate::{
    report::{ReportItem, ReportItemType},
    traits::ResourceValidator,
    types::Resource,
};

use super::{LOOKS_LIKE_HTML, LOOKS_LIKE_URL, SpellCheckValidator};

/// Plain text: neither markup nor URLs are allowed. Clean values are
/// spell-checked when a checker is chained.
#[derive(Debug, Default)]
pub struct TextValidator {
    spellcheck: Option<Arc<SpellCheckValidator>>,
}

impl TextValidator {
    pub fn new(spellcheck: Option<Arc<SpellCheckValidator>>) -> Self {
        TextValidator { spellcheck }
    }
}

impl ResourceValidator for TextValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        let mut items = Vec::new();
        if let Some(tag) = LOOKS_LIKE_HTML.find(resource.value) {
            items.push(ReportItem::new(
                ReportItemType::TextValidationNoHtml,
                resource.file_name(),
                resource.key,
                resource.value,
                format!("plain text must not contain markup ({})", tag.as_str()),
            ));
        }
        if LOOKS_LIKE_URL.is_match(resource.value) {
            items.push(ReportItem::new(
                ReportItemType::TextValidationNoUrl,
                resource.file_name(),
                resource.key,
                resource.value,
                "plain text must not contain a URL",
            ));
        }
        if items.is_empty()
            && let Some(spellcheck) = &self.spellcheck
        {
            items.extend(spellcheck.validate(resource));
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::test_support::family_with;

    fn types(value: &str) -> Vec<ReportItemType> {
        let family = family_with("k.text", "x", "");
        let file = &family.files()[0];
        TextValidator::default()
            .validate(&Resource::new(&family, file, "k.text", value))
            .into_iter()
            .map(|item| item.item_type)
            .collect()
    }

    #[test]
    fn test_markup_and_urls_rejected() {
        assert_eq!(types("Click <b>here</b>"), vec![ReportItemType::TextValidationNoHtml]);
        assert_eq!(types("Line<br/>break"), vec![ReportItemType::TextValidationNoHtml]);
        assert_eq!(types("See http://x.org"), vec![ReportItemType::TextValidationNoUrl]);
        assert_eq!(types("Write to mailto:a@b.c"), vec![ReportItemType::TextValidationNoUrl]);
        assert_eq!(
            types("<a href=\"//x\">y</a>"),
            vec![
                ReportItemType::TextValidationNoHtml,
                ReportItemType::TextValidationNoUrl
            ]
        );
    }

    #[test]
    fn test_plain_text_accepted() {
        assert!(types("1 < 2 and 3 > 2").is_empty());
        assert!(types("a/b and c").is_empty());
        assert!(types("Hello, world").is_empty());
    }
}
