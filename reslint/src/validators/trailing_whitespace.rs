use crate::{
    report::{ReportItem, ReportItemType},
    traits::ResourceValidator,
    types::Resource,
};

/// Flags values ending in any whitespace code point.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingWhitespaceValidator;

impl ResourceValidator for TrailingWhitespaceValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        match resource.value.chars().next_back() {
            Some(last) if last.is_whitespace() => vec![ReportItem::new(
                ReportItemType::TrailingWhitespace,
                resource.file_name(),
                resource.key,
                resource.value,
                format!("value ends with whitespace (U+{:04X})", u32::from(last)),
            )],
            _ => Vec::new(),
        }
    }
}
