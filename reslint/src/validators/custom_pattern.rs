use regex::Regex;

use crate::{
    error::Error,
    report::{ReportItem, ReportItemType},
    traits::ResourceValidator,
    types::Resource,
};

/// Requires the whole value to match a user-supplied regex.
#[derive(Debug, Clone)]
pub struct CustomPatternValidator {
    name: String,
    pattern: String,
    regex: Regex,
}

impl CustomPatternValidator {
    pub fn new(name: &str, pattern: &str) -> Result<Self, Error> {
        Ok(CustomPatternValidator {
            name: name.to_string(),
            pattern: pattern.to_string(),
            regex: Regex::new(&format!("^(?:{})$", pattern))?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ResourceValidator for CustomPatternValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        if self.regex.is_match(resource.value) {
            return Vec::new();
        }
        vec![ReportItem::new(
            ReportItemType::CustomPatternValidation,
            resource.file_name(),
            resource.key,
            resource.value,
            format!("value does not match pattern {} ({})", self.name, self.pattern),
        )]
    }
}
