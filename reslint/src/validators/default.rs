use std::sync::Arc;

use crate::{
    report::{ReportItem, ReportItemType},
    traits::ResourceValidator,
    types::Resource,
};

use super::{LOOKS_LIKE_HTML, LOOKS_LIKE_URL, SpellCheckValidator};

/// Fallback for keys no classifier claims. Markup or URLs in such values
/// are only warned about, since the key was never declared to hold them.
#[derive(Debug, Default)]
pub struct DefaultValidator {
    spellcheck: Option<Arc<SpellCheckValidator>>,
}

impl DefaultValidator {
    pub fn new(spellcheck: Option<Arc<SpellCheckValidator>>) -> Self {
        DefaultValidator { spellcheck }
    }
}

impl ResourceValidator for DefaultValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        let mut items = Vec::new();
        if LOOKS_LIKE_HTML.is_match(resource.value) {
            items.push(ReportItem::new(
                ReportItemType::UndeclaredHtml,
                resource.file_name(),
                resource.key,
                resource.value,
                "value looks like HTML but the key is not declared as an HTML key",
            ));
        }
        if LOOKS_LIKE_URL.is_match(resource.value) {
            items.push(ReportItem::new(
                ReportItemType::UndeclaredUrl,
                resource.file_name(),
                resource.key,
                resource.value,
                "value looks like a URL but the key is not declared as a URL key",
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
