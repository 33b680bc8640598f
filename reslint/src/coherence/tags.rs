use std::sync::Arc;

use crate::{
    formatter::{Formatter, render_value},
    report::{ReportItem, ReportItemType},
    traits::FamilyValidator,
    types::{ResourceFamilyView, join_file_names},
    validators::KeyClassifier,
    xhtml::{parse_lenient, strip_data_attributes},
};

use super::group_files;

/// Compares the element structure of HTML values across locales.
///
/// Values are parsed leniently, so broken markup still yields a shape; the
/// HTML validator reports the breakage itself. Sibling order is ignored,
/// nesting is not.
#[derive(Debug, Clone)]
pub struct HtmlTagCoherenceValidator {
    html_keys: KeyClassifier,
    formatter: Arc<dyn Formatter>,
}

impl HtmlTagCoherenceValidator {
    pub fn new(html_keys: KeyClassifier, formatter: Arc<dyn Formatter>) -> Self {
        HtmlTagCoherenceValidator {
            html_keys,
            formatter,
        }
    }

    /// Canonical tag shape of one value.
    pub fn signature(&self, value: &str) -> String {
        let rendered = render_value(self.formatter.as_ref(), value)
            .unwrap_or_else(|_| value.to_string());
        parse_lenient(&strip_data_attributes(&rendered)).tag_signature()
    }
}

impl FamilyValidator for HtmlTagCoherenceValidator {
    fn validate(&self, view: &ResourceFamilyView<'_>) -> Vec<ReportItem> {
        if !self.html_keys.matches(view.key()) {
            return Vec::new();
        }
        let existing = view.existing();
        let groups = group_files(
            existing
                .iter()
                .map(|(file, value)| (*file, self.signature(value))),
        );
        let Some((majority, minorities)) = groups.split_first() else {
            return Vec::new();
        };
        let majority_files = join_file_names(majority.files.iter().copied());

        minorities
            .iter()
            .map(|group| {
                let raw_value = group
                    .files
                    .first()
                    .and_then(|file| file.get(view.key()))
                    .unwrap_or_default();
                ReportItem::new(
                    ReportItemType::IncoherentTags,
                    join_file_names(group.files.iter().copied()),
                    view.key(),
                    raw_value,
                    format!("markup structure differs from {}", majority_files),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coherence::test_support::family, formatter::FormatterKind};

    fn validator() -> HtmlTagCoherenceValidator {
        HtmlTagCoherenceValidator::new(
            KeyClassifier::new(&[".html".to_string()]),
            FormatterKind::MessageFormat.build(),
        )
    }

    fn findings(key: &str, locales: &[(&str, &str)]) -> Vec<ReportItem> {
        let family = family(key, None, locales);
        validator().validate(&family.view(key))
    }

    #[test]
    fn test_sibling_order_is_irrelevant() {
        let items = findings("k.html", &[("de", "<div/><span/>"), ("fr", "<span/><div/>")]);
        assert!(items.is_empty());
    }

    #[test]
    fn test_nesting_is_relevant() {
        let items = findings(
            "k.html",
            &[("de", "<div><span/></div>"), ("fr", "<span><div/></span>")],
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, ReportItemType::IncoherentTags);
    }

    #[test]
    fn test_majority_wins() {
        let items = findings(
            "k.html",
            &[
                ("de", "<b>{0}</b> Dateien"),
                ("fr", "<b>{0}</b> fichiers"),
                ("it", "<i>{0}</i> file"),
            ],
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].location_file, "messages_it.properties");
    }

    #[test]
    fn test_only_html_keys() {
        let items = findings("k.text", &[("de", "<b>x</b>"), ("fr", "<i>x</i>")]);
        assert!(items.is_empty());
    }

    #[test]
    fn test_broken_markup_still_compared() {
        let items = findings("k.html", &[("de", "<b>x"), ("fr", "<b>x</b>")]);
        assert!(items.is_empty());
    }
}
