use std::sync::Arc;

use crate::{
    formatter::Formatter,
    report::{ReportItem, ReportItemType},
    traits::FamilyValidator,
    types::{ResourceFamilyView, join_file_names},
};

use super::group_files;

/// Compares the placeholder indices each locale uses for a key.
///
/// Files without placeholders are ignored. Every group of files whose index
/// list differs from the majority's is reported.
#[derive(Debug, Clone)]
pub struct ParametricCoherenceValidator {
    formatter: Arc<dyn Formatter>,
}

impl ParametricCoherenceValidator {
    pub fn new(formatter: Arc<dyn Formatter>) -> Self {
        ParametricCoherenceValidator { formatter }
    }
}

impl FamilyValidator for ParametricCoherenceValidator {
    fn validate(&self, view: &ResourceFamilyView<'_>) -> Vec<ReportItem> {
        let existing = view.existing();
        let captured: Vec<_> = existing
            .iter()
            .map(|(file, value)| (*file, self.formatter.capture_parameters(value)))
            .filter(|(_, parameters)| !parameters.is_empty())
            .collect();
        if captured.len() < 2 {
            return Vec::new();
        }

        let groups = group_files(captured);
        let Some((majority, minorities)) = groups.split_first() else {
            return Vec::new();
        };
        let majority_parameters = self.formatter.display_parameters(&majority.key);
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
                    ReportItemType::IncoherentParameters,
                    join_file_names(group.files.iter().copied()),
                    view.key(),
                    raw_value,
                    format!(
                        "uses parameters [{}] while {} use [{}]",
                        self.formatter.display_parameters(&group.key),
                        majority_files,
                        majority_parameters
                    ),
                )
            })
            .collect()
    }
}
