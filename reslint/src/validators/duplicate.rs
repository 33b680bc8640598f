//! Duplicates inside one file: keys written twice, and values shared by keys.

use crate::{
    report::{ReportItem, ReportItemType},
    traits::ResourceValidator,
    types::Resource,
};

/// One `DUPLICATE_KEY` error for each repeated assignment of the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateKeyValidator;

impl ResourceValidator for DuplicateKeyValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        resource
            .file
            .duplicate_keys()
            .iter()
            .filter(|duplicate| duplicate.key == resource.key)
            .map(|duplicate| {
                ReportItem::new(
                    ReportItemType::DuplicateKey,
                    resource.file_name(),
                    resource.key,
                    &duplicate.value,
                    format!(
                        "key redefined at line {}, previous value was \"{}\"",
                        duplicate.line, duplicate.previous_value
                    ),
                )
            })
            .collect()
    }
}

/// Notes keys whose value is also the value of other keys of the same file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateValueValidator;

impl ResourceValidator for DuplicateValueValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        if !resource.file.duplicated_value_keys().contains(resource.key) {
            return Vec::new();
        }
        let others = resource.file.keys_with_value(resource.value, resource.key);
        if others.is_empty() {
            return Vec::new();
        }
        vec![ReportItem::new(
            ReportItemType::DuplicateValue,
            resource.file_name(),
            resource.key,
            resource.value,
            format!("same value as {}", others.join(", ")),
        )]
    }
}
