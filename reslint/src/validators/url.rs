//! Absolute and protocol-relative URLs.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::{
    formatter::{Formatter, render_value},
    report::{ReportItem, ReportItemType},
    traits::ResourceValidator,
    types::Resource,
    xhtml::unescape_entities,
};

lazy_static! {
    static ref URL_REGEX: Regex = Regex::new(
        r"(?i)^(?:(?:(?:https?|ftp)://|//)[^\s/?#]+(?:[/?#]\S*)?|mailto:[^\s@]+@[^\s@]+\.[^\s@]+)$"
    )
    .unwrap();
    static ref PAGE_BASE: Url = Url::parse("https://resources.invalid/page").unwrap();
}

/// Extensions of resources a page imports; loading them over plain HTTP
/// from an HTTPS page is mixed content.
const IMPORTED_EXTENSIONS: [&str; 6] = ["js", "css", "gif", "jpg", "png", "ico"];

#[derive(Debug, Clone)]
pub struct UrlValidator {
    formatter: Arc<dyn Formatter>,
}

impl UrlValidator {
    pub fn new(formatter: Arc<dyn Formatter>) -> Self {
        UrlValidator { formatter }
    }
}

impl ResourceValidator for UrlValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        let item = |formatted: &str, item_type: ReportItemType, message: String| {
            vec![
                ReportItem::new(
                    item_type,
                    resource.file_name(),
                    resource.key,
                    resource.value,
                    message,
                )
                .with_formatted_value(formatted),
            ]
        };

        let rendered = match render_value(self.formatter.as_ref(), resource.value) {
            Ok(rendered) => rendered,
            Err(err) => {
                return item(resource.value, ReportItemType::MalformedParameter, err.message);
            }
        };
        let url = unescape_entities(&rendered);

        if !URL_REGEX.is_match(&url) {
            return item(
                &url,
                ReportItemType::UrlValidation,
                "not an absolute, protocol-relative or mailto URL".to_string(),
            );
        }

        let Ok(resolved) = PAGE_BASE.join(&url) else {
            return item(
                &url,
                ReportItemType::UrlValidation,
                "URL cannot be resolved".to_string(),
            );
        };
        if resolved.scheme() != "https"
            && let Some(extension) = extension(&resolved)
            && IMPORTED_EXTENSIONS.contains(&extension.as_str())
        {
            return item(
                &url,
                ReportItemType::UrlValidation,
                format!(
                    "{} resource must be scheme-relative to avoid mixed content",
                    extension
                ),
            );
        }
        Vec::new()
    }
}

/// Lower-cased extension of the last path segment.
fn extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let (_, extension) = segment.rsplit_once('.')?;
    Some(extension.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{formatter::FormatterKind, validators::test_support::family_with};

    fn types(kind: FormatterKind, value: &str) -> Vec<ReportItemType> {
        let family = family_with("k.url", "x", "");
        let file = &family.files()[0];
        UrlValidator::new(kind.build())
            .validate(&Resource::new(&family, file, "k.url", value))
            .into_iter()
            .map(|item| item.item_type)
            .collect()
    }

    fn errors(value: &str) -> usize {
        types(FormatterKind::MessageFormat, value).len()
    }

    #[test]
    fn test_mixed_content() {
        assert_eq!(errors("http://host/image.png"), 1);
        assert_eq!(errors("//host/image.png"), 0);
        assert_eq!(errors("http://host/page.html"), 0);
        assert_eq!(errors("https://host/app.js"), 0);
        assert_eq!(errors("http://host/STYLE.CSS?v=2"), 1);
        assert_eq!(errors("ftp://host/icon.ico"), 1);
    }

    #[test]
    fn test_accepted_forms() {
        assert_eq!(errors("https://example.com"), 0);
        assert_eq!(errors("HTTP://example.com/a/b?c=d#e"), 0);
        assert_eq!(errors("mailto:help@example.com"), 0);
        assert_eq!(errors("http://host/search?a=1&amp;b=2"), 0);
    }

    #[test]
    fn test_rejected_forms() {
        assert_eq!(errors("example.com/page"), 1);
        assert_eq!(errors("/relative/path"), 1);
        assert_eq!(errors("mailto:nobody"), 1);
        assert_eq!(errors("http://host/with space"), 1);
        assert_eq!(errors("javascript:alert(1)"), 1);
    }

    #[test]
    fn test_parametric_urls() {
        assert_eq!(errors("https://host/users/{0}/avatar.png"), 0);
        assert_eq!(errors("http://host/{0}.png"), 1);
        assert_eq!(
            types(FormatterKind::MessageFormat, "https://host/{0}/{1"),
            vec![ReportItemType::MalformedParameter]
        );
        assert_eq!(
            types(FormatterKind::CStyle, "https://host/%1$s/x"),
            Vec::<ReportItemType>::new()
        );
    }
}
