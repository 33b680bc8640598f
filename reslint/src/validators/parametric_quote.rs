use std::sync::Arc;

use crate::{
    formatter::Formatter,
    report::{ReportItem, ReportItemType},
    traits::ResourceValidator,
    types::Resource,
};

/// Flags parametric values with a single quote the formatter would treat as
/// the start of a literal section.
#[derive(Debug, Clone)]
pub struct ParametricQuoteValidator {
    formatter: Arc<dyn Formatter>,
}

impl ParametricQuoteValidator {
    pub fn new(formatter: Arc<dyn Formatter>) -> Self {
        ParametricQuoteValidator { formatter }
    }
}

impl ResourceValidator for ParametricQuoteValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        if !self.formatter.has_unescaped_quote(resource.value) {
            return Vec::new();
        }
        vec![ReportItem::new(
            ReportItemType::ParametricQuote,
            resource.file_name(),
            resource.key,
            resource.value,
            "single quote in a parametric value must be doubled ('')",
        )]
    }
}
